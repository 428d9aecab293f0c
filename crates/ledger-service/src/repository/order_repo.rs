//! 订单仓储
//!
//! 订单登记依赖 `number` 唯一约束实现先到先得；
//! 状态迁移用带前置状态的条件 UPDATE，保证终态不可回退

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use super::balance_repo::BalanceRepository;
use super::traits::OrderRepositoryTrait;
use crate::error::{LedgerError, Result};
use crate::models::{Order, OrderStatus, SubmitOutcome};

/// 订单仓储
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 写入操作 ====================

    /// 登记订单
    ///
    /// `ON CONFLICT DO NOTHING` 保证并发提交同一订单号时只有一方写入成功，
    /// 未写入的一方再读取所有者判断归属
    pub async fn register_if_new(&self, login: &str, number: &str) -> Result<SubmitOutcome> {
        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO orders (number, login, status, accrual, uploaded_at)
            VALUES ($1, $2, $3, 0, NOW())
            ON CONFLICT (number) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(number)
        .bind(login)
        .bind(OrderStatus::New)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            return Ok(SubmitOutcome::Created);
        }

        let owner: Option<String> = sqlx::query_scalar(
            r#"
            SELECT login FROM orders WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            Some(owner) if owner == login => Ok(SubmitOutcome::OwnedByCaller),
            Some(_) => Ok(SubmitOutcome::OwnedByOther),
            None => Err(LedgerError::Internal(format!(
                "订单 {} 插入冲突但查询不到记录",
                number
            ))),
        }
    }

    /// 认领待对账订单
    ///
    /// 同一事务内先把全部 NEW 推进为 PROCESSING，再返回全部 PROCESSING
    pub async fn claim_pending(&self) -> Result<Vec<Order>> {
        let mut tx = self.pool.begin().await?;

        let promoted = sqlx::query(
            r#"
            UPDATE orders SET status = $1 WHERE status = $2
            "#,
        )
        .bind(OrderStatus::Processing)
        .bind(OrderStatus::New)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, login, status, accrual, uploaded_at
            FROM orders
            WHERE status = $1
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(OrderStatus::Processing)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(promoted, claimed = orders.len(), "认领待对账订单");
        Ok(orders)
    }

    /// 标记订单为 INVALID
    pub async fn mark_invalid(&self, number: &str) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE orders SET status = $1
            WHERE number = $2 AND status IN ($3, $4)
            "#,
        )
        .bind(OrderStatus::Invalid)
        .bind(number)
        .bind(OrderStatus::New)
        .bind(OrderStatus::Processing)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    /// 标记订单为 PROCESSED 并给所有者入账
    ///
    /// 状态迁移与入账在同一事务内完成；订单已处于终态时不做任何变更，
    /// 因此同一订单的积分最多入账一次
    pub async fn mark_processed(&self, number: &str, accrual: Decimal) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE orders SET status = $1, accrual = $2
            WHERE number = $3 AND status IN ($4, $5)
            RETURNING login
            "#,
        )
        .bind(OrderStatus::Processed)
        .bind(accrual)
        .bind(number)
        .bind(OrderStatus::New)
        .bind(OrderStatus::Processing)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(login) = owner else {
            tx.rollback().await?;
            return Ok(false);
        };

        BalanceRepository::credit_in_tx(&mut tx, &login, accrual).await?;
        tx.commit().await?;

        Ok(true)
    }

    // ==================== 查询操作 ====================

    /// 列出用户订单
    pub async fn list_by_user(&self, login: &str) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, login, status, accrual, uploaded_at
            FROM orders
            WHERE login = $1
            ORDER BY uploaded_at ASC, id ASC
            "#,
        )
        .bind(login)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// 根据订单号查询
    pub async fn get_by_number(&self, number: &str) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, number, login, status, accrual, uploaded_at
            FROM orders
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn register_if_new(&self, login: &str, number: &str) -> Result<SubmitOutcome> {
        self.register_if_new(login, number).await
    }

    async fn list_by_user(&self, login: &str) -> Result<Vec<Order>> {
        self.list_by_user(login).await
    }

    async fn claim_pending(&self) -> Result<Vec<Order>> {
        self.claim_pending().await
    }

    async fn mark_invalid(&self, number: &str) -> Result<bool> {
        self.mark_invalid(number).await
    }

    async fn mark_processed(&self, number: &str, accrual: Decimal) -> Result<bool> {
        self.mark_processed(number, accrual).await
    }
}
