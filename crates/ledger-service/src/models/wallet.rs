//! 余额与提现实体定义

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 用户余额
///
/// 不变量：current >= 0 且 current + withdrawn 等于已入账积分总和
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Balance {
    /// 当前可用积分
    pub current: Decimal,
    /// 累计已提现积分
    pub withdrawn: Decimal,
}

/// 提现记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: i64,
    pub login: String,
    /// 提现关联的订单号（不要求已登记）
    pub order_number: String,
    pub amount: Decimal,
    pub processed_at: DateTime<Utc>,
}
