//! 用户仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::balance_repo::BalanceRepository;
use super::traits::UserRepositoryTrait;
use crate::error::{LedgerError, Result};
use crate::models::User;

/// 用户仓储
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建用户并开立余额账户
    ///
    /// 两条记录在同一事务内写入，任何用户都不会缺少余额行
    pub async fn create_with_balance(&self, login: &str, password_hash: &str) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (login, password_hash, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(LedgerError::DuplicateLogin(login.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        BalanceRepository::open_in_tx(&mut tx, login).await?;
        tx.commit().await?;

        Ok(id)
    }

    /// 根据登录名查询用户
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password_hash, created_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create_with_balance(&self, login: &str, password_hash: &str) -> Result<i64> {
        self.create_with_balance(login, password_hash).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        self.find_by_login(login).await
    }
}
