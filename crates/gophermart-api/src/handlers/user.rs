//! 注册与登录处理器
//!
//! 成功后签发会话 Token，同时写入 Authorization 头和 `token` Cookie

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;
use validator::Validate;

use crate::auth::TOKEN_COOKIE;
use crate::dto::CredentialsRequest;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 注册
///
/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    req.validate()?;

    state.users.register(&req.login, &req.password).await?;
    info!(login = %req.login, "新用户注册");

    session_response(&state, &req.login)
}

/// 登录
///
/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(req) = payload?;
    req.validate()?;

    state.users.login(&req.login, &req.password).await?;

    session_response(&state, &req.login)
}

fn session_response(state: &AppState, login: &str) -> Result<Response> {
    let (token, _expires_at) = state.jwt_manager.generate_token(login)?;

    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::Internal(format!("Token 无法写入响应头: {}", e)))?;
    let cookie = HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; Max-Age={}",
        TOKEN_COOKIE,
        token,
        state.jwt_manager.expires_in_secs()
    ))
    .map_err(|e| ApiError::Internal(format!("Cookie 无法写入响应头: {}", e)))?;

    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(header::AUTHORIZATION, bearer);
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}
