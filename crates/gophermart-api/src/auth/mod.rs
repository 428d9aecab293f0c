//! 认证模块
//!
//! 提供 JWT Token 生成与验证。密码哈希由账本服务的 `UserService` 负责。

mod jwt;

pub use jwt::{Claims, JwtConfig, JwtManager, TOKEN_COOKIE};
