use crate::api::NewReceiptItem;
use crate::app::state::AppState;

use super::common::{map_api_error, parse_date, to_json};

// ==========================================
// 收料单相关命令
// ==========================================

/// 创建收料单（库管）
#[tauri::command(rename_all = "snake_case")]
pub async fn create_receipt(
    state: tauri::State<'_, AppState>,
    supplier: String,
    document_date: String,
    items: Vec<NewReceiptItem>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let document_date = parse_date(&document_date)?;

    let receipt_api = state.receipt_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.create_receipt");
        receipt_api.create_receipt(&actor, &supplier, document_date, &items)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 收料单过账（库管）
#[tauri::command(rename_all = "snake_case")]
pub async fn process_receipt(
    state: tauri::State<'_, AppState>,
    document_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let receipt_api = state.receipt_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.process_receipt");
        receipt_api.process_receipt(&actor, document_id)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按ID查询收料单
#[tauri::command(rename_all = "snake_case")]
pub async fn get_receipt(
    state: tauri::State<'_, AppState>,
    document_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let result = state
        .receipt_api
        .get_receipt(&actor, document_id)
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 收料单列表
#[tauri::command(rename_all = "snake_case")]
pub async fn list_receipts(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let actor = state.current_user()?;
    let receipt_api = state.receipt_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_receipts");
        receipt_api.list_receipts(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}
