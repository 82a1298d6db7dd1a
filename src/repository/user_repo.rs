// ==========================================
// 纺织家具生产经营系统 - 用户仓储
// ==========================================
// 职责: users 表的数据访问
// 红线: 不含业务逻辑（认证/散列校验在 API 层）
// ==========================================

use crate::domain::types::Role;
use crate::domain::user::User;
use crate::repository::db_utils::{parse_code, parse_utc};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

/// 认证查询结果: 用户 + 口令散列材料
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_salt: String,
    pub password_hash: String,
}

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    /// 创建新的 UserRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let role_raw: String = row.get(1)?;
        let created_raw: String = row.get(4)?;
        Ok(User {
            id: row.get(0)?,
            role: parse_code(1, &role_raw, "角色", Role::from_code)?,
            full_name: row.get(2)?,
            login: row.get(3)?,
            created_at: parse_utc(4, &created_raw)?,
        })
    }

    /// 插入用户
    ///
    /// # 参数
    /// - role/full_name/login: 用户主数据
    /// - password_salt/password_hash: 口令散列材料（API 层生成）
    ///
    /// # 返回
    /// - `Ok(User)`: 插入成功
    /// - `Err(UniqueConstraintViolation)`: 登录名已存在
    pub fn insert(
        &self,
        role: Role,
        full_name: &str,
        login: &str,
        password_salt: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<User> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (role, full_name, login, password_salt, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                role.as_code(),
                full_name,
                login,
                password_salt,
                password_hash,
                created_at.to_rfc3339(),
            ],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            role,
            full_name: full_name.to_string(),
            login: login.to_string(),
            created_at,
        })
    }

    /// 按登录名查询认证材料
    ///
    /// # 返回
    /// - `Ok(Some)`: 找到用户（含散列材料）
    /// - `Ok(None)`: 登录名不存在
    pub fn find_credentials_by_login(
        &self,
        login: &str,
    ) -> RepositoryResult<Option<UserCredentials>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT id, role, full_name, login, created_at, password_salt, password_hash
                FROM users
                WHERE login = ?1
                "#,
                params![login],
                |row| {
                    Ok(UserCredentials {
                        user: Self::map_user(row)?,
                        password_salt: row.get(5)?,
                        password_hash: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    /// 按ID查询用户
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT id, role, full_name, login, created_at
                FROM users
                WHERE id = ?1
                "#,
                params![id],
                Self::map_user,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询用户列表（可按角色过滤），按姓名排序
    pub fn list(&self, role: Option<Role>) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;

        let mut result = Vec::new();
        match role {
            Some(r) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, role, full_name, login, created_at
                    FROM users
                    WHERE role = ?1
                    ORDER BY full_name
                    "#,
                )?;
                let rows = stmt.query_map(params![r.as_code()], Self::map_user)?;
                for row in rows {
                    result.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, role, full_name, login, created_at
                    FROM users
                    ORDER BY full_name
                    "#,
                )?;
                let rows = stmt.query_map([], Self::map_user)?;
                for row in rows {
                    result.push(row?);
                }
            }
        }
        Ok(result)
    }
}
