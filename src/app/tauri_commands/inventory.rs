use crate::app::state::AppState;
use crate::domain::inventory::InventoryItem;

use super::common::{map_api_error, parse_date, to_json};

// ==========================================
// 盘点相关命令
// ==========================================

/// 生成盘点快照（库管）
#[tauri::command(rename_all = "snake_case")]
pub async fn prepare_inventory_snapshot(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let inventory_api = state.inventory_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.prepare_inventory_snapshot");
        inventory_api.prepare_snapshot(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 保存盘点单（库管；process=true 表示保存即过账）
#[tauri::command(rename_all = "snake_case")]
pub async fn save_inventory_document(
    state: tauri::State<'_, AppState>,
    document_date: String,
    items: Vec<InventoryItem>,
    process: bool,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let document_date = parse_date(&document_date)?;

    let inventory_api = state.inventory_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.save_inventory_document");
        inventory_api.save_document(&actor, document_date, items, process)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 审批盘点单（总监）
#[tauri::command(rename_all = "snake_case")]
pub async fn approve_inventory_document(
    state: tauri::State<'_, AppState>,
    document_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let inventory_api = state.inventory_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        inventory_api.approve_document(&actor, document_id)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 盘点单过账（库管/总监）
#[tauri::command(rename_all = "snake_case")]
pub async fn process_inventory_document(
    state: tauri::State<'_, AppState>,
    document_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let inventory_api = state.inventory_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.process_inventory_document");
        inventory_api.process_document(&actor, document_id)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按ID查询盘点单
#[tauri::command(rename_all = "snake_case")]
pub async fn get_inventory_document(
    state: tauri::State<'_, AppState>,
    document_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let result = state
        .inventory_api
        .get_document(&actor, document_id)
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 盘点单列表
#[tauri::command(rename_all = "snake_case")]
pub async fn list_inventory_documents(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let inventory_api = state.inventory_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_inventory_documents");
        inventory_api.list_documents(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}
