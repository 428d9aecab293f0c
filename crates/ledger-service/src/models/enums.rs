//! 账本枚举类型定义
//!
//! 订单状态同时支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 订单状态
///
/// 状态只会沿 NEW → PROCESSING → {INVALID | PROCESSED} 单向推进，
/// INVALID 和 PROCESSED 为终态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 已登记，尚未被对账 Worker 认领
    #[default]
    New,
    /// 已被认领，等待 accrual 服务给出结论
    Processing,
    /// accrual 服务拒绝计算积分
    Invalid,
    /// 积分已计算并入账
    Processed,
}

impl OrderStatus {
    /// 是否为终态
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Processing => "PROCESSING",
            Self::Invalid => "INVALID",
            Self::Processed => "PROCESSED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订单登记结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 首次登记
    Created,
    /// 订单已由当前用户登记过
    OwnedByCaller,
    /// 订单已被其他用户登记
    OwnedByOther,
}

/// 提现结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Ok,
    /// 余额不足，账户未做任何变更
    InsufficientFunds,
}
