//! REST 层错误类型定义
//!
//! 负责把账本服务的业务结果映射为 HTTP 状态码

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loyalty_ledger::LedgerError;
use serde_json::json;

/// REST 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("登录名或密码错误")]
    InvalidCredentials,

    // 请求错误
    #[error("请求格式错误: {0}")]
    BadRequest(String),
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("订单号格式错误: {0}")]
    MalformedOrderNumber(String),
    #[error("订单号校验失败: {0}")]
    InvalidOrderNumber(String),

    // 业务冲突
    #[error("登录名已被占用: {0}")]
    LoginTaken(String),
    #[error("订单已被其他用户上传")]
    OrderOwnedByOther,
    #[error("余额不足")]
    InsufficientFunds,

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Validation(_) | Self::MalformedOrderNumber(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::LoginTaken(_) | Self::OrderOwnedByOther => StatusCode::CONFLICT,
            Self::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MalformedOrderNumber(_) => "MALFORMED_ORDER_NUMBER",
            Self::InvalidOrderNumber(_) => "INVALID_ORDER_NUMBER",
            Self::LoginTaken(_) => "LOGIN_TAKEN",
            Self::OrderOwnedByOther => "ORDER_OWNED_BY_OTHER",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "code": self.error_code(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体无法解析为 JSON 时统一返回 400
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// 从账本服务的错误转换
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        // 系统错误统一映射为 500，细节在 into_response 中记日志
        if !err.is_business_error() {
            return match err {
                LedgerError::Database(e) => Self::Database(e),
                other => Self::Internal(other.to_string()),
            };
        }

        match err {
            LedgerError::MalformedOrderNumber(n) => Self::MalformedOrderNumber(n),
            LedgerError::InvalidOrderNumber(n) => Self::InvalidOrderNumber(n),
            LedgerError::DuplicateLogin(login) => Self::LoginTaken(login),
            LedgerError::InvalidCredentials => Self::InvalidCredentials,
            LedgerError::Validation(msg) => Self::Validation(msg),
            // 会话中的登录名在库中不存在，视为会话失效
            LedgerError::UserNotFound(_) => Self::Unauthorized("用户不存在".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (ApiError::BadRequest("bad json".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ApiError::Validation("login".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::MalformedOrderNumber("12a".into()), StatusCode::BAD_REQUEST, "MALFORMED_ORDER_NUMBER"),
            (ApiError::InvalidOrderNumber("123".into()), StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ORDER_NUMBER"),
            (ApiError::LoginTaken("alice".into()), StatusCode::CONFLICT, "LOGIN_TAKEN"),
            (ApiError::OrderOwnedByOther, StatusCode::CONFLICT, "ORDER_OWNED_BY_OTHER"),
            (ApiError::InsufficientFunds, StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_FUNDS"),
            (ApiError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            (ApiError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_status_and_code_mapping() {
        for (err, status, code) in all_error_variants() {
            assert_eq!(err.status_code(), status, "{:?}", err);
            assert_eq!(err.error_code(), code, "{:?}", err);
        }
    }

    #[test]
    fn test_ledger_error_conversion() {
        assert!(matches!(
            ApiError::from(LedgerError::InvalidOrderNumber("1".into())),
            ApiError::InvalidOrderNumber(_)
        ));
        assert!(matches!(
            ApiError::from(LedgerError::DuplicateLogin("alice".into())),
            ApiError::LoginTaken(_)
        ));
        assert!(matches!(
            ApiError::from(LedgerError::Internal("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_ledger_system_errors_map_to_500() {
        let db = ApiError::from(LedgerError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(db, ApiError::Database(_)));
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let user = ApiError::from(LedgerError::UserNotFound("ghost".into()));
        assert_eq!(user.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_system_error_details_are_hidden() {
        let response = ApiError::Internal("connection string leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("connection string"));
        assert!(text.contains("INTERNAL_ERROR"));
    }
}
