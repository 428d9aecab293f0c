//! 业务服务层
//!
//! - `OrderService`: 订单登记与查询
//! - `BalanceService`: 余额查询、提现与提现记录
//! - `UserService`: 注册与登录校验

mod balance_service;
mod order_service;
mod user_service;

pub use balance_service::BalanceService;
pub use order_service::OrderService;
pub use user_service::UserService;
