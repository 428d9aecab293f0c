//! 订单实体定义

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::OrderStatus;

/// 用户登记的订单
///
/// `accrual` 只有在 PROCESSED 状态下才有意义，其余状态为 0
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// 订单号（全局唯一）
    pub number: String,
    /// 订单所有者
    pub login: String,
    pub status: OrderStatus,
    /// 入账积分
    pub accrual: Decimal,
    pub uploaded_at: DateTime<Utc>,
}

impl Order {
    /// 对外展示的积分，仅 PROCESSED 订单返回
    pub fn visible_accrual(&self) -> Option<Decimal> {
        (self.status == OrderStatus::Processed).then_some(self.accrual)
    }
}
