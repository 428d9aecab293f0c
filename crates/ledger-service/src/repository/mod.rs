//! 数据库仓储层
//!
//! 提供所有实体的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 状态迁移与余额变动必须在同一事务内完成，由仓储保证
//! - 定义 trait 接口以支持 mock 测试

mod balance_repo;
mod order_repo;
mod traits;
mod user_repo;

pub use balance_repo::BalanceRepository;
pub use order_repo::OrderRepository;
pub use traits::*;
pub use user_repo::UserRepository;
