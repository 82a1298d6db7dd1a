use crate::app::state::AppState;

use super::common::{map_api_error, parse_date, to_json};

// ==========================================
// 报表相关命令
// ==========================================

/// 物料库存报表
#[tauri::command(rename_all = "snake_case")]
pub async fn material_stock_report(
    state: tauri::State<'_, AppState>,
    articles: Option<Vec<String>>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let report_api = state.report_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.material_stock_report");
        report_api.material_stock_report(&actor, articles.as_deref())
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 物料收发存报表
#[tauri::command(rename_all = "snake_case")]
pub async fn material_movement_report(
    state: tauri::State<'_, AppState>,
    from: String,
    to: String,
    articles: Option<Vec<String>>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let from = parse_date(&from)?;
    let to = parse_date(&to)?;

    let report_api = state.report_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.material_movement_report");
        report_api.material_movement_report(&actor, from, to, articles.as_deref())
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}
