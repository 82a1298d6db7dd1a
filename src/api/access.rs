// ==========================================
// 纺织家具生产经营系统 - 角色权限校验
// ==========================================
// 权限模型: 客户下单 / 经理推进订单与维护目录 /
//           库管收发盘点 / 总监审批
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Role;
use crate::domain::user::User;

/// 校验操作主体角色
///
/// # 参数
/// - user: 当前操作用户
/// - allowed: 允许的角色集合
///
/// # 返回
/// - `Ok(())`: 角色允许
/// - `Err(ApiError::Forbidden)`: 权限不足
pub fn ensure_role(user: &User, allowed: &[Role]) -> ApiResult<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            required: allowed
                .iter()
                .map(|r| r.as_code())
                .collect::<Vec<_>>()
                .join("/"),
            actual: user.role.as_code().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: 1,
            role,
            full_name: "测试用户".to_string(),
            login: "tester".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_allowed_role_passes() {
        assert!(ensure_role(&user(Role::Director), &[Role::Director]).is_ok());
        assert!(ensure_role(&user(Role::Manager), &[Role::Manager, Role::Director]).is_ok());
    }

    #[test]
    fn test_disallowed_role_is_forbidden() {
        let result = ensure_role(&user(Role::Customer), &[Role::Warehouse]);
        match result {
            Err(ApiError::Forbidden { required, actual }) => {
                assert_eq!(required, "WAREHOUSE");
                assert_eq!(actual, "CUSTOMER");
            }
            _ => panic!("Expected Forbidden"),
        }
    }
}
