// ==========================================
// 纺织家具生产经营系统 - 认证 API
// ==========================================
// 职责: 登录认证、客户自助注册、员工账号管理
// 口令口径: hex(sha256(salt || password))，盐为每用户随机值
// 红线: 登录名不存在与口令错误对外不可区分
// ==========================================

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::access::ensure_role;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::Role;
use crate::domain::user::{NewUser, User};
use crate::repository::error::RepositoryError;
use crate::repository::user_repo::UserRepository;

// ==========================================
// AuthApi - 认证 API
// ==========================================
pub struct AuthApi {
    user_repo: Arc<UserRepository>,
}

impl AuthApi {
    /// 创建新的 AuthApi 实例
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 计算口令散列: hex(sha256(salt || password))
    fn hash_password(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// 登录认证
    ///
    /// # 返回
    /// - `Ok(Some(User))`: 认证成功
    /// - `Ok(None)`: 登录名不存在或口令错误（对外不区分）
    pub fn authenticate(&self, login: &str, password: &str) -> ApiResult<Option<User>> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(ApiError::InvalidInput("登录名与口令不能为空".to_string()));
        }

        let credentials = match self.user_repo.find_credentials_by_login(login)? {
            Some(c) => c,
            None => {
                warn!(login, "认证失败: 登录名不存在");
                return Ok(None);
            }
        };

        let hash = Self::hash_password(&credentials.password_salt, password);
        if hash != credentials.password_hash {
            warn!(login, "认证失败: 口令错误");
            return Ok(None);
        }

        info!(login, role = %credentials.user.role, "认证成功");
        Ok(Some(credentials.user))
    }

    /// 客户自助注册（始终落为 CUSTOMER 角色）
    ///
    /// # 返回
    /// - `Ok(User)`: 注册成功
    /// - `Err(BusinessRuleViolation)`: 登录名已被占用
    pub fn register_customer(
        &self,
        full_name: &str,
        login: &str,
        password: &str,
    ) -> ApiResult<User> {
        self.insert_user(Role::Customer, full_name, login, password)
    }

    /// 创建员工账号（总监专用）
    pub fn create_user(&self, actor: &User, new_user: &NewUser) -> ApiResult<User> {
        ensure_role(actor, &[Role::Director])?;
        self.insert_user(
            new_user.role,
            &new_user.full_name,
            &new_user.login,
            &new_user.password,
        )
    }

    fn insert_user(
        &self,
        role: Role,
        full_name: &str,
        login: &str,
        password: &str,
    ) -> ApiResult<User> {
        let full_name = full_name.trim();
        let login = login.trim();
        if full_name.is_empty() {
            return Err(ApiError::InvalidInput("姓名不能为空".to_string()));
        }
        if login.is_empty() {
            return Err(ApiError::InvalidInput("登录名不能为空".to_string()));
        }
        if password.len() < 4 {
            return Err(ApiError::InvalidInput("口令长度不能少于4位".to_string()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let hash = Self::hash_password(&salt, password);

        let user = self
            .user_repo
            .insert(role, full_name, login, &salt, &hash, chrono::Utc::now())
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => {
                    ApiError::BusinessRuleViolation(format!("登录名已被占用: {}", login))
                }
                other => other.into(),
            })?;

        info!(login, role = %user.role, "用户创建成功");
        Ok(user)
    }

    /// 查询用户列表（经理/总监；用于指派与管理页面）
    pub fn list_users(&self, actor: &User, role: Option<Role>) -> ApiResult<Vec<User>> {
        ensure_role(actor, &[Role::Manager, Role::Director])?;
        Ok(self.user_repo.list(role)?)
    }
}
