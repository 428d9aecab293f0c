//! 余额与提现处理器

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use loyalty_ledger::WithdrawOutcome;

use crate::auth::Claims;
use crate::dto::{BalanceDto, WithdrawRequest, WithdrawalDto};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 查询余额
///
/// GET /api/user/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<BalanceDto>> {
    let balance = state.balances.get_balance(claims.login()).await?;
    Ok(Json(balance.into()))
}

/// 提现
///
/// POST /api/user/balance/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: std::result::Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(req) = payload?;

    match state
        .balances
        .withdraw(claims.login(), &req.order, req.sum)
        .await?
    {
        WithdrawOutcome::Ok => Ok(StatusCode::OK),
        WithdrawOutcome::InsufficientFunds => Err(ApiError::InsufficientFunds),
    }
}

/// 当前用户的提现记录；没有记录时返回 204
///
/// GET /api/user/withdrawals
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Response> {
    let withdrawals = state.balances.list_withdrawals(claims.login()).await?;
    if withdrawals.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let dtos: Vec<WithdrawalDto> = withdrawals.into_iter().map(WithdrawalDto::from).collect();
    Ok(Json(dtos).into_response())
}
