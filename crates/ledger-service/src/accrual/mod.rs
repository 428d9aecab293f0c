//! 外部 accrual 服务客户端
//!
//! accrual 服务根据订单号给出积分结论。接口约定：
//!
//! - `GET {base}/api/orders/{number}`
//! - 200：`{"order": "...", "status": "REGISTERED|INVALID|PROCESSING|PROCESSED", "accrual": 500}`
//! - 204：订单未在 accrual 服务登记
//! - 429：限流，`Retry-After` 头给出需要暂停的秒数
//! - 其他状态码视为传输失败

mod client;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::HttpAccrualClient;

/// accrual 服务返回的订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// accrual 服务的 200 响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualVerdict {
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Decimal>,
}

/// 一次查询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AccrualReply {
    Verdict(AccrualVerdict),
    /// 订单未在 accrual 服务登记
    NotRegistered,
    /// 被限流，需暂停给定时长后再查询
    RetryAfter(Duration),
}

/// accrual 客户端错误
#[derive(Debug, Error)]
pub enum AccrualError {
    #[error("accrual 请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("accrual 返回非预期状态码: {0}")]
    UnexpectedStatus(u16),

    #[error("accrual 响应解析失败: {0}")]
    Decode(String),
}

/// accrual 服务客户端接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn query(&self, number: &str) -> Result<AccrualReply, AccrualError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_verdict_deserialize() {
        let v: AccrualVerdict =
            serde_json::from_str(r#"{"order":"79927398713","status":"PROCESSED","accrual":500}"#)
                .unwrap();
        assert_eq!(v.status, AccrualStatus::Processed);
        assert_eq!(v.accrual, Some(dec!(500)));

        let v: AccrualVerdict =
            serde_json::from_str(r#"{"order":"79927398713","status":"REGISTERED"}"#).unwrap();
        assert_eq!(v.status, AccrualStatus::Registered);
        assert_eq!(v.accrual, None);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let res =
            serde_json::from_str::<AccrualVerdict>(r#"{"order":"1","status":"DONE"}"#);
        assert!(res.is_err());
    }
}
