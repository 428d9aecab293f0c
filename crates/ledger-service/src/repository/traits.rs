//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层和 Worker 依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Balance, Order, SubmitOutcome, User, Withdrawal, WithdrawOutcome};

/// 订单仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    /// 订单号不存在时登记为 NEW，否则报告当前所有者
    async fn register_if_new(&self, login: &str, number: &str) -> Result<SubmitOutcome>;

    /// 用户的所有订单，按登记时间升序
    async fn list_by_user(&self, login: &str) -> Result<Vec<Order>>;

    /// 将所有 NEW 订单推进为 PROCESSING，并按登记时间返回全部 PROCESSING 订单
    async fn claim_pending(&self) -> Result<Vec<Order>>;

    /// 标记为 INVALID，返回是否发生了状态迁移
    async fn mark_invalid(&self, number: &str) -> Result<bool>;

    /// 标记为 PROCESSED 并在同一事务内入账，返回是否发生了状态迁移
    async fn mark_processed(&self, number: &str, accrual: Decimal) -> Result<bool>;
}

/// 余额仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceRepositoryTrait: Send + Sync {
    async fn get_balance(&self, login: &str) -> Result<Balance>;

    /// 原子扣减余额并写入提现记录
    async fn withdraw(
        &self,
        login: &str,
        order_number: &str,
        amount: Decimal,
    ) -> Result<WithdrawOutcome>;

    /// 用户的提现记录，按处理时间升序
    async fn list_withdrawals(&self, login: &str) -> Result<Vec<Withdrawal>>;
}

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// 创建用户并同时开立余额账户，登录名重复返回 `DuplicateLogin`
    async fn create_with_balance(&self, login: &str, password_hash: &str) -> Result<i64>;

    async fn find_by_login(&self, login: &str) -> Result<Option<User>>;
}
