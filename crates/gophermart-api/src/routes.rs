//! 路由配置模块
//!
//! 注册与登录为公开路由，其余 `/api/user/*` 端点需要登录

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use loyalty_shared::observability::middleware as obs_middleware;
use tower_http::{
    compression::CompressionLayer, decompression::RequestDecompressionLayer,
    timeout::TimeoutLayer,
};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 构建公开路由（无需认证）
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(handlers::user::register))
        .route("/user/login", post(handlers::user::login))
}

/// 构建需要认证的路由
///
/// 认证中间件通过 `route_layer` 挂载，未匹配的路径仍返回 404 而不是 401
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user/orders",
            post(handlers::orders::submit_order).get(handlers::orders::list_orders),
        )
        .route("/user/balance", get(handlers::balance::get_balance))
        .route("/user/balance/withdraw", post(handlers::balance::withdraw))
        .route("/user/withdrawals", get(handlers::balance::list_withdrawals))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// 构建所有 `/api` 路由
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}

/// 构建完整应用
///
/// 包含 API 路由、健康检查以及压缩、超时、追踪等通用中间件
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestDecompressionLayer::new())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
