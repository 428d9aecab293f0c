//! Mock Accrual 服务
//!
//! 模拟外部积分计算服务，用于开发和测试环境。
//!
//! # 主要模块
//!
//! - `store`: 内存存储实现
//! - `service`: accrual REST 接口与限流开关
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use mock_accrual::service::{AccrualServiceState, VerdictStatus};
//!
//! # async fn demo() -> std::io::Result<()> {
//! let state = AccrualServiceState::new();
//! state.set_verdict("79927398713", VerdictStatus::Processed, Some(500.0));
//!
//! let addr = mock_accrual::service::serve_ephemeral(state.clone()).await?;
//! println!("mock accrual listening on http://{}", addr);
//! # Ok(())
//! # }
//! ```

pub mod service;
pub mod store;
