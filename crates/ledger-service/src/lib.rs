//! 积分账本核心服务
//!
//! 负责订单登记、积分对账、余额与提现记账。HTTP 层只做协议转换，
//! 所有业务不变量都在本 crate 内保证。
//!
//! ## 核心功能
//!
//! - **订单登记**：Luhn 校验后登记订单，订单号全局唯一，先到者拥有
//! - **积分对账**：后台 Worker 轮询外部 accrual 服务，推进订单状态并入账
//! - **余额记账**：入账与提现在同一事务内完成，余额永不为负
//! - **用户注册**：注册时同事务开户，保证每个用户都有余额行
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `order_number`: 订单号格式与 Luhn 校验
//! - `repository`: 数据库仓储层
//! - `service`: 业务服务层
//! - `accrual`: 外部 accrual 服务客户端
//! - `worker`: 对账 Worker

pub mod accrual;
pub mod error;
pub mod models;
pub mod order_number;
pub mod repository;
pub mod service;
pub mod worker;

pub use accrual::{AccrualClient, AccrualError, AccrualReply, AccrualStatus, HttpAccrualClient};
pub use error::{LedgerError, Result};
pub use models::*;
pub use repository::{BalanceRepository, OrderRepository, UserRepository};
pub use service::{BalanceService, OrderService, UserService};
pub use worker::{CycleReport, ReconcileWorker, WorkerHandle};
