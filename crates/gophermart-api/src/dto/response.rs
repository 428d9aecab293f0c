//! 响应 DTO

use chrono::{DateTime, Utc};
use loyalty_ledger::{Balance, Order, OrderStatus, Withdrawal};
use rust_decimal::Decimal;
use serde::Serialize;

/// 订单
#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub number: String,
    pub status: OrderStatus,
    /// 仅 PROCESSED 订单返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            accrual: order.visible_accrual(),
            number: order.number,
            status: order.status,
            uploaded_at: order.uploaded_at,
        }
    }
}

/// 余额
#[derive(Debug, Serialize)]
pub struct BalanceDto {
    pub current: Decimal,
    pub withdrawn: Decimal,
}

impl From<Balance> for BalanceDto {
    fn from(balance: Balance) -> Self {
        Self {
            current: balance.current,
            withdrawn: balance.withdrawn,
        }
    }
}

/// 提现记录
#[derive(Debug, Serialize)]
pub struct WithdrawalDto {
    pub order: String,
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalDto {
    fn from(w: Withdrawal) -> Self {
        Self {
            order: w.order_number,
            sum: w.amount,
            processed_at: w.processed_at,
        }
    }
}
