//! 账本领域模型
//!
//! 包含用户、订单、余额、提现等核心实体定义

pub mod enums;
pub mod order;
pub mod user;
pub mod wallet;

// 重新导出常用类型
pub use enums::{OrderStatus, SubmitOutcome, WithdrawOutcome};
pub use order::Order;
pub use user::User;
pub use wallet::{Balance, Withdrawal};
