//! 请求 DTO

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// 注册 / 登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 255, message = "登录名长度必须在 1-255 之间"))]
    pub login: String,
    #[validate(length(min = 1, max = 72, message = "密码长度必须在 1-72 之间"))]
    pub password: String,
}

/// 提现请求
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// 提现关联的订单号
    pub order: String,
    /// 提现积分
    pub sum: Decimal,
}
