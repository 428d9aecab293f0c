//! 余额仓储
//!
//! 提现使用 FOR UPDATE 锁定余额行，同一用户的并发提现被串行化

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::traits::BalanceRepositoryTrait;
use crate::error::{LedgerError, Result};
use crate::models::{Balance, Withdrawal, WithdrawOutcome};

/// 余额仓储
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 查询用户余额
    pub async fn get_balance(&self, login: &str) -> Result<Balance> {
        sqlx::query_as::<_, Balance>(
            r#"
            SELECT current, withdrawn FROM balances WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| LedgerError::UserNotFound(login.to_string()))
    }

    /// 列出用户提现记录
    pub async fn list_withdrawals(&self, login: &str) -> Result<Vec<Withdrawal>> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            r#"
            SELECT id, login, order_number, amount, processed_at
            FROM withdrawals
            WHERE login = $1
            ORDER BY processed_at ASC, id ASC
            "#,
        )
        .bind(login)
        .fetch_all(&self.pool)
        .await?;

        Ok(withdrawals)
    }

    // ==================== 写入操作 ====================

    /// 提现
    ///
    /// 余额不足时回滚事务，账户与提现记录均不变
    pub async fn withdraw(
        &self,
        login: &str,
        order_number: &str,
        amount: Decimal,
    ) -> Result<WithdrawOutcome> {
        let mut tx = self.pool.begin().await?;

        let balance = Self::get_balance_for_update(&mut tx, login)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(login.to_string()))?;

        if amount > balance.current {
            tx.rollback().await?;
            return Ok(WithdrawOutcome::InsufficientFunds);
        }

        sqlx::query(
            r#"
            UPDATE balances
            SET current = current - $2, withdrawn = withdrawn + $2
            WHERE login = $1
            "#,
        )
        .bind(login)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO withdrawals (login, order_number, amount, processed_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(login)
        .bind(order_number)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(WithdrawOutcome::Ok)
    }

    // ==================== 事务操作 ====================

    /// 在事务中获取余额（带行级锁）
    pub async fn get_balance_for_update(
        tx: &mut PgConnection,
        login: &str,
    ) -> Result<Option<Balance>> {
        let balance = sqlx::query_as::<_, Balance>(
            r#"
            SELECT current, withdrawn FROM balances
            WHERE login = $1
            FOR UPDATE
            "#,
        )
        .bind(login)
        .fetch_optional(tx)
        .await?;

        Ok(balance)
    }

    /// 在事务中开立余额账户
    pub async fn open_in_tx(tx: &mut PgConnection, login: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO balances (login, current, withdrawn) VALUES ($1, 0, 0)
            "#,
        )
        .bind(login)
        .execute(tx)
        .await?;

        Ok(())
    }

    /// 在事务中入账
    pub async fn credit_in_tx(tx: &mut PgConnection, login: &str, amount: Decimal) -> Result<()> {
        let affected = sqlx::query(
            r#"
            UPDATE balances SET current = current + $2 WHERE login = $1
            "#,
        )
        .bind(login)
        .bind(amount)
        .execute(tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(LedgerError::UserNotFound(login.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BalanceRepositoryTrait for BalanceRepository {
    async fn get_balance(&self, login: &str) -> Result<Balance> {
        self.get_balance(login).await
    }

    async fn withdraw(
        &self,
        login: &str,
        order_number: &str,
        amount: Decimal,
    ) -> Result<WithdrawOutcome> {
        self.withdraw(login, order_number, amount).await
    }

    async fn list_withdrawals(&self, login: &str) -> Result<Vec<Withdrawal>> {
        self.list_withdrawals(login).await
    }
}
