use crate::app::state::AppState;
use crate::domain::types::MaterialKind;

use super::common::{map_api_error, to_json};

// ==========================================
// 物料台账相关命令
// ==========================================

fn parse_kind(kind: &str) -> Result<MaterialKind, String> {
    MaterialKind::from_code(kind).ok_or_else(|| format!("无效物料类别: {}", kind))
}

/// 面料卷台账
#[tauri::command(rename_all = "snake_case")]
pub async fn list_fabric_stock(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let actor = state.current_user()?;
    let material_api = state.material_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_fabric_stock");
        material_api.list_fabric_stock(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 辅料批次台账
#[tauri::command(rename_all = "snake_case")]
pub async fn list_fitting_stock(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let actor = state.current_user()?;
    let material_api = state.material_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_fitting_stock");
        material_api.list_fitting_stock(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 加权平均成本
#[tauri::command(rename_all = "snake_case")]
pub async fn get_average_cost(
    state: tauri::State<'_, AppState>,
    article: String,
    kind: String,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let kind = parse_kind(&kind)?;
    let result = state
        .material_api
        .average_cost(&actor, &article, kind)
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 余料判定
#[tauri::command(rename_all = "snake_case")]
pub async fn check_scrap(
    state: tauri::State<'_, AppState>,
    article: String,
    kind: String,
    remaining_quantity: f64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let kind = parse_kind(&kind)?;
    let result = state
        .material_api
        .is_scrap(&actor, &article, kind, remaining_quantity)
        .map_err(map_api_error)?;
    to_json(&result)
}
