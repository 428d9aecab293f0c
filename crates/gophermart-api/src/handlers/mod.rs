//! HTTP 请求处理器模块

pub mod balance;
pub mod health;
pub mod orders;
pub mod user;
