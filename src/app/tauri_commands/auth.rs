use crate::app::state::AppState;
use crate::domain::types::Role;
use crate::domain::user::NewUser;

use super::common::{map_api_error, to_json};

// ==========================================
// 认证相关命令
// ==========================================

/// 登录（成功后写入会话）
#[tauri::command(rename_all = "snake_case")]
pub async fn login(
    state: tauri::State<'_, AppState>,
    login: String,
    password: String,
) -> Result<String, String> {
    let auth_api = state.auth_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        let _perf = crate::perf::PerfGuard::new("ipc.login");
        auth_api.authenticate(&login, &password)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    state.set_session(result.clone())?;
    to_json(&result)
}

/// 注销（清空会话）
#[tauri::command(rename_all = "snake_case")]
pub async fn logout(state: tauri::State<'_, AppState>) -> Result<String, String> {
    state.set_session(None)?;
    to_json(&serde_json::json!({ "ok": true }))
}

/// 查询当前登录用户
#[tauri::command(rename_all = "snake_case")]
pub async fn current_user(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let user = state
        .session
        .lock()
        .map_err(|e| format!("会话锁获取失败: {}", e))?
        .clone();
    to_json(&user)
}

/// 客户自助注册
#[tauri::command(rename_all = "snake_case")]
pub async fn register_customer(
    state: tauri::State<'_, AppState>,
    full_name: String,
    login: String,
    password: String,
) -> Result<String, String> {
    let auth_api = state.auth_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || {
        auth_api.register_customer(&full_name, &login, &password)
    })
    .await
    .map_err(|e| format!("任务执行失败: {}", e))?
    .map_err(map_api_error)?;

    to_json(&result)
}

/// 创建员工账号（总监）
#[tauri::command(rename_all = "snake_case")]
pub async fn create_user(
    state: tauri::State<'_, AppState>,
    new_user: NewUser,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let auth_api = state.auth_api.clone();
    let result =
        tauri::async_runtime::spawn_blocking(move || auth_api.create_user(&actor, &new_user))
            .await
            .map_err(|e| format!("任务执行失败: {}", e))?
            .map_err(map_api_error)?;

    to_json(&result)
}

/// 用户列表（经理/总监）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_users(
    state: tauri::State<'_, AppState>,
    role: Option<String>,
) -> Result<String, String> {
    let actor = state.current_user()?;
    let role = match role.as_deref() {
        Some(code) => Some(Role::from_code(code).ok_or_else(|| format!("无效角色: {}", code))?),
        None => None,
    };

    let auth_api = state.auth_api.clone();
    let result = tauri::async_runtime::spawn_blocking(move || auth_api.list_users(&actor, role))
        .await
        .map_err(|e| format!("任务执行失败: {}", e))?
        .map_err(map_api_error)?;

    to_json(&result)
}
