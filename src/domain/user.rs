// ==========================================
// 纺织家具生产经营系统 - 用户领域模型
// ==========================================

use crate::domain::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// User - 已认证用户
// ==========================================
// 用途: 认证成功后贯穿 API 层作为操作主体
// 红线: 不携带口令散列（散列只存在于仓储层查询内部）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,             // 用户ID
    pub role: Role,          // 角色
    pub full_name: String,   // 姓名
    pub login: String,       // 登录名（唯一）
    pub created_at: DateTime<Utc>, // 注册时间
}

// ==========================================
// NewUser - 注册入参
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub role: Role,
    pub full_name: String,
    pub login: String,
    pub password: String,
}
