//! HttpAccrualClient 与对账 Worker 的端到端测试
//!
//! 使用 mock-accrual 在本地随机端口启动 accrual 服务，订单存储使用内存实现。

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use loyalty_ledger::accrual::{AccrualClient, AccrualError, AccrualReply, AccrualStatus};
use loyalty_ledger::error::Result;
use loyalty_ledger::models::{Order, OrderStatus, SubmitOutcome};
use loyalty_ledger::repository::OrderRepositoryTrait;
use loyalty_ledger::{HttpAccrualClient, ReconcileWorker};
use loyalty_shared::config::{AccrualConfig, ReconcileConfig};
use mock_accrual::service::{AccrualServiceState, ThrottleRequest, VerdictStatus, serve_ephemeral};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ==================== 辅助类型 ====================

/// 内存订单存储，入账记录在 `credits` 中
#[derive(Default)]
struct InMemoryOrders {
    orders: Mutex<Vec<Order>>,
    credits: Mutex<HashMap<String, Decimal>>,
}

impl InMemoryOrders {
    fn status_of(&self, number: &str) -> Option<OrderStatus> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.number == number)
            .map(|o| o.status)
    }

    fn credited(&self, login: &str) -> Decimal {
        self.credits
            .lock()
            .unwrap()
            .get(login)
            .copied()
            .unwrap_or_default()
    }

    fn transition(&self, number: &str, to: OrderStatus, accrual: Decimal) -> Option<String> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.number == number && !o.status.is_final())?;
        order.status = to;
        order.accrual = accrual;
        Some(order.login.clone())
    }
}

#[async_trait]
impl OrderRepositoryTrait for InMemoryOrders {
    async fn register_if_new(&self, login: &str, number: &str) -> Result<SubmitOutcome> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(existing) = orders.iter().find(|o| o.number == number) {
            return Ok(if existing.login == login {
                SubmitOutcome::OwnedByCaller
            } else {
                SubmitOutcome::OwnedByOther
            });
        }
        let id = orders.len() as i64 + 1;
        orders.push(Order {
            id,
            number: number.to_string(),
            login: login.to_string(),
            status: OrderStatus::New,
            accrual: Decimal::ZERO,
            uploaded_at: Utc::now(),
        });
        Ok(SubmitOutcome::Created)
    }

    async fn list_by_user(&self, login: &str) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.login == login)
            .cloned()
            .collect())
    }

    async fn claim_pending(&self) -> Result<Vec<Order>> {
        let mut orders = self.orders.lock().unwrap();
        for order in orders.iter_mut().filter(|o| o.status == OrderStatus::New) {
            order.status = OrderStatus::Processing;
        }
        Ok(orders
            .iter()
            .filter(|o| o.status == OrderStatus::Processing)
            .cloned()
            .collect())
    }

    async fn mark_invalid(&self, number: &str) -> Result<bool> {
        Ok(self
            .transition(number, OrderStatus::Invalid, Decimal::ZERO)
            .is_some())
    }

    async fn mark_processed(&self, number: &str, accrual: Decimal) -> Result<bool> {
        let Some(login) = self.transition(number, OrderStatus::Processed, accrual) else {
            return Ok(false);
        };
        *self.credits.lock().unwrap().entry(login).or_default() += accrual;
        Ok(true)
    }
}

async fn start_mock() -> (AccrualServiceState, HttpAccrualClient) {
    let state = AccrualServiceState::new();
    let addr = serve_ephemeral(state.clone()).await.unwrap();
    let config = AccrualConfig {
        base_url: format!("http://{}", addr),
        request_timeout_seconds: 5,
    };
    let client = HttpAccrualClient::new(&config, Duration::from_secs(60)).unwrap();
    (state, client)
}

// ==================== HttpAccrualClient ====================

#[tokio::test]
async fn test_client_reads_verdict() {
    let (state, client) = start_mock().await;
    state.set_verdict("79927398713", VerdictStatus::Processed, Some(500.0));

    match client.query("79927398713").await.unwrap() {
        AccrualReply::Verdict(v) => {
            assert_eq!(v.order, "79927398713");
            assert_eq!(v.status, AccrualStatus::Processed);
            assert_eq!(v.accrual, Some(dec!(500)));
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_maps_no_content_to_not_registered() {
    let (_state, client) = start_mock().await;
    assert_eq!(
        client.query("125764357").await.unwrap(),
        AccrualReply::NotRegistered
    );
}

#[tokio::test]
async fn test_client_reads_retry_after() {
    let (state, client) = start_mock().await;

    state.set_throttle(Some(ThrottleRequest {
        retry_after: Some(5),
        requests: Some(1),
    }));
    assert_eq!(
        client.query("125764357").await.unwrap(),
        AccrualReply::RetryAfter(Duration::from_secs(5))
    );

    state.set_throttle(Some(ThrottleRequest {
        retry_after: None,
        requests: Some(1),
    }));
    assert_eq!(
        client.query("125764357").await.unwrap(),
        AccrualReply::RetryAfter(Duration::from_secs(60))
    );
}

#[tokio::test]
async fn test_client_transport_error() {
    let config = AccrualConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_seconds: 2,
    };
    let client = HttpAccrualClient::new(&config, Duration::from_secs(60)).unwrap();

    assert!(matches!(
        client.query("125764357").await,
        Err(AccrualError::Transport(_))
    ));
}

// ==================== ReconcileWorker ====================

#[tokio::test]
async fn test_worker_reconciles_through_throttle() {
    let (state, client) = start_mock().await;
    state.set_verdict("79927398713", VerdictStatus::Processed, Some(500.0));
    state.set_verdict("125764357", VerdictStatus::Invalid, None);
    state.set_throttle(Some(ThrottleRequest {
        retry_after: Some(1),
        requests: Some(1),
    }));

    let orders = Arc::new(InMemoryOrders::default());
    orders.register_if_new("alice", "79927398713").await.unwrap();
    orders.register_if_new("alice", "125764357").await.unwrap();
    orders.register_if_new("bob", "4561261212345467").await.unwrap();

    let config = ReconcileConfig {
        poll_interval_ms: 50,
        ..Default::default()
    };
    let handle = ReconcileWorker::new(orders.clone(), Arc::new(client), &config).start();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while orders.status_of("125764357") != Some(OrderStatus::Invalid)
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    // 再多跑几轮，验证终态订单不会重复入账
    tokio::time::sleep(Duration::from_millis(300)).await;
    handle.stop().await;

    assert_eq!(orders.status_of("79927398713"), Some(OrderStatus::Processed));
    assert_eq!(orders.status_of("125764357"), Some(OrderStatus::Invalid));
    assert_eq!(
        orders.status_of("4561261212345467"),
        Some(OrderStatus::Processing)
    );
    assert_eq!(orders.credited("alice"), dec!(500));
    assert_eq!(orders.credited("bob"), dec!(0));
}
