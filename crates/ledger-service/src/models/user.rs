//! 用户实体定义

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 注册用户
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub login: String,
    /// bcrypt 哈希，不对外序列化
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
