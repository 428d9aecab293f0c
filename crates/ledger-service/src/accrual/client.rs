//! 基于 reqwest 的 accrual 客户端

use std::time::Duration;

use async_trait::async_trait;
use loyalty_shared::config::AccrualConfig;
use reqwest::{StatusCode, header::RETRY_AFTER};
use tracing::{debug, warn};

use super::{AccrualClient, AccrualError, AccrualReply, AccrualVerdict};

/// HTTP accrual 客户端
#[derive(Clone)]
pub struct HttpAccrualClient {
    client: reqwest::Client,
    base_url: String,
    /// Retry-After 缺失或无法解析时的暂停时长
    default_retry_after: Duration,
}

impl HttpAccrualClient {
    pub fn new(config: &AccrualConfig, default_retry_after: Duration) -> Result<Self, AccrualError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_retry_after,
        })
    }

    fn order_url(&self, number: &str) -> String {
        format!("{}/api/orders/{}", self.base_url, number)
    }

    /// 解析 Retry-After 秒数
    fn retry_after(&self, headers: &reqwest::header::HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_retry_after)
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn query(&self, number: &str) -> Result<AccrualReply, AccrualError> {
        let response = self.client.get(self.order_url(number)).send().await?;
        let status = response.status();

        debug!(order = %number, status = %status, "accrual 查询返回");

        match status {
            StatusCode::OK => {
                let verdict = response
                    .json::<AccrualVerdict>()
                    .await
                    .map_err(|e| AccrualError::Decode(e.to_string()))?;
                if verdict.order != number {
                    warn!(order = %number, replied = %verdict.order, "accrual 返回的订单号不一致");
                }
                Ok(AccrualReply::Verdict(verdict))
            }
            StatusCode::NO_CONTENT => Ok(AccrualReply::NotRegistered),
            StatusCode::TOO_MANY_REQUESTS => {
                Ok(AccrualReply::RetryAfter(self.retry_after(response.headers())))
            }
            other => Err(AccrualError::UnexpectedStatus(other.as_u16())),
        }
    }
}
