use crate::api::NewOrderItem;
use crate::app::state::AppState;
use crate::domain::types::OrderStatus;

use super::common::{map_api_error, parse_date, to_json};

// ==========================================
// 订单相关命令
// ==========================================

/// 客户下单
#[tauri::command(rename_all = "snake_case")]
pub async fn create_order(
    state: tauri::State<'_, AppState>,
    items: Vec<NewOrderItem>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let order_api = state.order_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.create_order");
        order_api.create_order(&actor, &items)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 客户查询自己的订单
#[tauri::command(rename_all = "snake_case")]
pub async fn list_my_orders(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let actor = state.current_user()?;
    let order_api = state.order_api.clone();
    let result =
        tauri::async_runtime::spawn_blocking(move || order_api.list_my_orders(&actor))
            .await
            .map_err(|e| format!("任务执行失败: {}", e))?
            .map_err(map_api_error)?;

    to_json(&result)
}

/// 经理/总监查询全部订单
#[tauri::command(rename_all = "snake_case")]
pub async fn list_all_orders(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let actor = state.current_user()?;
    let order_api = state.order_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_all_orders");
        order_api.list_all_orders(&actor)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 按ID查询订单
#[tauri::command(rename_all = "snake_case")]
pub async fn get_order(
    state: tauri::State<'_, AppState>,
    order_id: i64,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let result = state
        .order_api
        .get_order(&actor, order_id)
        .map_err(map_api_error)?;
    to_json(&result)
}

/// 经理推进订单状态
#[tauri::command(rename_all = "snake_case")]
pub async fn update_order_status(
    state: tauri::State<'_, AppState>,
    order_id: i64,
    new_status: String,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let status = OrderStatus::from_code(&new_status)
        .ok_or_else(|| format!("无效订单状态: {}", new_status))?;

    let order_api = state.order_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        order_api.update_status(&actor, order_id, status)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 订单列表行（报表/列表页）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_order_summaries(
    state: tauri::State<'_, AppState>,
    from: Option<String>,
    to: Option<String>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let from = from.as_deref().map(parse_date).transpose()?;
    let to = to.as_deref().map(parse_date).transpose()?;

    let order_api = state.order_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.list_order_summaries");
        order_api.list_order_summaries(&actor, from, to)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}
