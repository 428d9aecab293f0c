//! 订单处理器

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use loyalty_ledger::SubmitOutcome;

use crate::auth::Claims;
use crate::dto::OrderDto;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 上传订单号
///
/// POST /api/user/orders，请求体为纯文本订单号
pub async fn submit_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: String,
) -> Result<StatusCode> {
    match state.orders.submit_order(claims.login(), &body).await? {
        SubmitOutcome::Created => Ok(StatusCode::ACCEPTED),
        SubmitOutcome::OwnedByCaller => Ok(StatusCode::OK),
        SubmitOutcome::OwnedByOther => Err(ApiError::OrderOwnedByOther),
    }
}

/// 当前用户的订单列表，按上传时间升序；没有订单时返回 204
///
/// GET /api/user/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Response> {
    let orders = state.orders.list_orders(claims.login()).await?;
    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let dtos: Vec<OrderDto> = orders.into_iter().map(OrderDto::from).collect();
    Ok(Json(dtos).into_response())
}
