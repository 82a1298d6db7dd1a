use crate::app::state::AppState;
use crate::domain::catalog::{Fabric, Fitting, ManufacturedGood};

use super::common::{map_api_error, to_json};

// ==========================================
// 目录相关命令
// ==========================================

/// 面料目录
#[tauri::command(rename_all = "snake_case")]
pub async fn list_fabrics(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let catalog_api = state.catalog_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_fabrics");
        catalog_api.list_fabrics()
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按货号查询面料
#[tauri::command(rename_all = "snake_case")]
pub async fn get_fabric(
    state: tauri::State<'_, AppState>,
    article: String,
) -> Result<String, String> {
    let result = state.catalog_api.get_fabric(&article).map_err(map_api_error)?;
    to_json(&result)
}

/// 辅料目录
#[tauri::command(rename_all = "snake_case")]
pub async fn list_fittings(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let catalog_api = state.catalog_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_fittings");
        catalog_api.list_fittings()
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按货号查询辅料
#[tauri::command(rename_all = "snake_case")]
pub async fn get_fitting(
    state: tauri::State<'_, AppState>,
    article: String,
) -> Result<String, String> {
    let result = state
        .catalog_api
        .get_fitting(&article)
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 成品目录
#[tauri::command(rename_all = "snake_case")]
pub async fn list_goods(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let catalog_api = state.catalog_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_goods");
        catalog_api.list_goods()
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按货号查询成品
#[tauri::command(rename_all = "snake_case")]
pub async fn get_good(
    state: tauri::State<'_, AppState>,
    article: String,
) -> Result<String, String> {
    let result = state.catalog_api.get_good(&article).map_err(map_api_error)?;
    to_json(&result)
}

/// 新增/修改面料（经理）
#[tauri::command(rename_all = "snake_case")]
pub async fn upsert_fabric(
    state: tauri::State<'_, AppState>,
    fabric: Fabric,
) -> Result<String, String> {
    let actor = state.current_user()?;
    state
        .catalog_api
        .upsert_fabric(&actor, &fabric)
        .map_err(map_api_error)?;
    to_json(&serde_json::json!({ "ok": true }))
}

/// 新增/修改辅料（经理）
#[tauri::command(rename_all = "snake_case")]
pub async fn upsert_fitting(
    state: tauri::State<'_, AppState>,
    fitting: Fitting,
) -> Result<String, String> {
    let actor = state.current_user()?;
    state
        .catalog_api
        .upsert_fitting(&actor, &fitting)
        .map_err(map_api_error)?;
    to_json(&serde_json::json!({ "ok": true }))
}

/// 新增/修改成品（经理）
#[tauri::command(rename_all = "snake_case")]
pub async fn upsert_good(
    state: tauri::State<'_, AppState>,
    good: ManufacturedGood,
) -> Result<String, String> {
    let actor = state.current_user()?;
    state
        .catalog_api
        .upsert_good(&actor, &good)
        .map_err(map_api_error)?;
    to_json(&serde_json::json!({ "ok": true }))
}
