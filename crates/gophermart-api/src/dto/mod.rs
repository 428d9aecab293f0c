//! REST 层 DTO 模块
//!
//! 对外 JSON 字段使用 snake_case，与既有客户端约定保持一致

pub mod request;
pub mod response;

pub use request::{CredentialsRequest, WithdrawRequest};
pub use response::{BalanceDto, OrderDto, WithdrawalDto};
