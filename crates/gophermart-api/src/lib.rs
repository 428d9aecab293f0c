//! Gophermart REST 服务
//!
//! 对外提供注册、登录、订单上传、余额与提现的 HTTP API，
//! 业务规则全部委托给 `loyalty_ledger`。
//!
//! ## 模块结构
//!
//! - `auth`: JWT 会话签发与校验
//! - `cli`: 命令行参数（兼容 -a/-d/-r）
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型与 HTTP 状态码映射
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证中间件
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 会话：jsonwebtoken，Token 同时通过 Authorization 头和 `token` Cookie 下发

pub mod auth;
pub mod cli;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, Result};
pub use state::AppState;
