//! 账本服务错误类型
//!
//! 定义服务层的业务错误和系统错误

use thiserror::Error;

/// 账本服务错误类型
#[derive(Debug, Error)]
pub enum LedgerError {
    // === 订单号相关错误 ===
    #[error("订单号格式错误: {0}")]
    MalformedOrderNumber(String),

    #[error("订单号未通过 Luhn 校验: {0}")]
    InvalidOrderNumber(String),

    // === 用户相关错误 ===
    #[error("登录名已被占用: {0}")]
    DuplicateLogin(String),

    #[error("登录名或密码错误")]
    InvalidCredentials,

    #[error("用户不存在: {0}")]
    UserNotFound(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("密码哈希失败: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("内部错误: {0}")]
    Internal(String),

    #[error("参数校验失败: {0}")]
    Validation(String),
}

/// 账本服务 Result 类型别名
pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }

    /// 是否为业务错误（可直接反馈给调用方）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::PasswordHash(_) | Self::Internal(_)
        )
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedOrderNumber(_) => "MALFORMED_ORDER_NUMBER",
            Self::InvalidOrderNumber(_) => "INVALID_ORDER_NUMBER",
            Self::DuplicateLogin(_) => "DUPLICATE_LOGIN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(LedgerError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!LedgerError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!LedgerError::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(LedgerError::InvalidOrderNumber("123".to_string()).is_business_error());
        assert!(LedgerError::DuplicateLogin("alice".to_string()).is_business_error());
        assert!(!LedgerError::Internal("boom".to_string()).is_business_error());
        assert!(!LedgerError::Database(sqlx::Error::PoolClosed).is_business_error());
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            LedgerError::MalformedOrderNumber("12a".to_string()).error_code(),
            "MALFORMED_ORDER_NUMBER"
        );
        assert_eq!(
            LedgerError::InvalidCredentials.error_code(),
            "INVALID_CREDENTIALS"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UserNotFound("alice".to_string());
        assert!(err.to_string().contains("alice"));
    }
}
