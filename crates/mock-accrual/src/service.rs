//! Mock accrual 服务
//!
//! 实现与真实 accrual 服务相同的查询接口，并提供设置结论和限流的管理接口：
//!
//! - `GET /api/orders/{number}`：200 返回结论，204 表示未登记，限流时返回 429
//! - `PUT /api/orders/{number}`：设置订单结论
//! - `PUT /admin/throttle` / `DELETE /admin/throttle`：打开或关闭限流

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::store::MemoryStore;

/// 订单结论状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Registered,
    Invalid,
    Processing,
    Processed,
}

/// 订单结论（即查询接口的响应体）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub order: String,
    pub status: VerdictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<f64>,
}

/// 设置结论请求
#[derive(Debug, Deserialize)]
pub struct SetVerdictRequest {
    pub status: VerdictStatus,
    #[serde(default)]
    pub accrual: Option<f64>,
}

/// 限流设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleRequest {
    /// Retry-After 秒数，None 时不返回该头
    #[serde(default)]
    pub retry_after: Option<u64>,
    /// 接下来多少次查询返回 429，None 表示直到关闭
    #[serde(default)]
    pub requests: Option<u32>,
}

/// 服务状态
#[derive(Clone, Default)]
pub struct AccrualServiceState {
    verdicts: MemoryStore<Verdict>,
    throttle: Arc<Mutex<Option<ThrottleRequest>>>,
    queries: Arc<AtomicUsize>,
}

impl AccrualServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置订单结论
    pub fn set_verdict(&self, number: &str, status: VerdictStatus, accrual: Option<f64>) {
        self.verdicts.insert(
            number,
            Verdict {
                order: number.to_string(),
                status,
                accrual,
            },
        );
    }

    pub fn set_throttle(&self, throttle: Option<ThrottleRequest>) {
        if let Ok(mut guard) = self.throttle.lock() {
            *guard = throttle;
        }
    }

    /// 累计收到的查询次数
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// 消耗一次限流额度，返回本次是否应被限流
    fn take_throttle(&self) -> Option<ThrottleRequest> {
        let mut guard = self.throttle.lock().ok()?;
        let current = (*guard)?;

        match current.requests {
            Some(0) => {
                *guard = None;
                None
            }
            Some(1) => {
                *guard = None;
                Some(current)
            }
            Some(n) => {
                *guard = Some(ThrottleRequest {
                    requests: Some(n - 1),
                    ..current
                });
                Some(current)
            }
            None => Some(current),
        }
    }
}

/// 构建路由
pub fn accrual_routes() -> Router<AccrualServiceState> {
    Router::new()
        .route("/api/orders/{number}", get(get_verdict).put(set_verdict))
        .route("/admin/throttle", put(enable_throttle).delete(disable_throttle))
}

/// 构建带状态的完整应用
pub fn app(state: AccrualServiceState) -> Router {
    accrual_routes().with_state(state)
}

/// 在随机端口启动服务，返回监听地址
pub async fn serve_ephemeral(state: AccrualServiceState) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            error!("Mock accrual server error: {}", e);
        }
    });

    Ok(addr)
}

/// 查询订单结论
///
/// GET /api/orders/{number}
async fn get_verdict(
    State(state): State<AccrualServiceState>,
    Path(number): Path<String>,
) -> Response {
    state.queries.fetch_add(1, Ordering::SeqCst);

    if let Some(throttle) = state.take_throttle() {
        info!(order = %number, "限流中，返回 429");
        let mut response = (StatusCode::TOO_MANY_REQUESTS, "No more than N requests per minute allowed")
            .into_response();
        if let Some(secs) = throttle.retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        return response;
    }

    match state.verdicts.get(&number) {
        Some(verdict) => Json(verdict).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// 设置订单结论
///
/// PUT /api/orders/{number}
async fn set_verdict(
    State(state): State<AccrualServiceState>,
    Path(number): Path<String>,
    Json(req): Json<SetVerdictRequest>,
) -> StatusCode {
    info!(order = %number, status = ?req.status, accrual = ?req.accrual, "设置订单结论");
    state.set_verdict(&number, req.status, req.accrual);
    StatusCode::NO_CONTENT
}

/// PUT /admin/throttle
async fn enable_throttle(
    State(state): State<AccrualServiceState>,
    Json(req): Json<ThrottleRequest>,
) -> StatusCode {
    info!(retry_after = ?req.retry_after, requests = ?req.requests, "开启限流");
    state.set_throttle(Some(req));
    StatusCode::NO_CONTENT
}

/// DELETE /admin/throttle
async fn disable_throttle(State(state): State<AccrualServiceState>) -> StatusCode {
    info!("关闭限流");
    state.set_throttle(None);
    StatusCode::NO_CONTENT
}
