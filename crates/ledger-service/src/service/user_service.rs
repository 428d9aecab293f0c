//! 用户服务
//!
//! 密码使用 bcrypt 哈希存储，登录时校验哈希

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::models::User;
use crate::repository::UserRepositoryTrait;

/// 用户服务
pub struct UserService<UR>
where
    UR: UserRepositoryTrait,
{
    user_repo: Arc<UR>,
    hash_cost: u32,
}

impl<UR> UserService<UR>
where
    UR: UserRepositoryTrait,
{
    pub fn new(user_repo: Arc<UR>) -> Self {
        Self {
            user_repo,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// 指定 bcrypt cost（测试中使用较小值加速）
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// 注册用户，同时开立余额为 0 的账户
    #[instrument(skip(self, password))]
    pub async fn register(&self, login: &str, password: &str) -> Result<i64> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(LedgerError::Validation("登录名和密码不能为空".to_string()));
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let id = self
            .user_repo
            .create_with_balance(login, &password_hash)
            .await?;

        info!(user_id = id, "用户注册成功");
        Ok(id)
    }

    /// 校验登录凭据
    ///
    /// 用户不存在与密码错误返回同一个错误，不暴露登录名是否已注册
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<User> {
        let Some(user) = self.user_repo.find_by_login(login).await? else {
            warn!("登录失败：用户不存在");
            return Err(LedgerError::InvalidCredentials);
        };

        if !bcrypt::verify(password, &user.password_hash)? {
            warn!("登录失败：密码错误");
            return Err(LedgerError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepositoryTrait;
    use chrono::Utc;

    fn stored_user(password: &str) -> User {
        User {
            id: 7,
            login: "alice".to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_create_with_balance()
            .withf(|login, hash| {
                login == "alice" && hash != "secret" && bcrypt::verify("secret", hash).unwrap()
            })
            .times(1)
            .returning(|_, _| Ok(7));

        let service = UserService::new(Arc::new(repo)).with_hash_cost(4);
        assert_eq!(service.register("alice", "secret").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_register_duplicate_login() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_create_with_balance()
            .returning(|login, _| Err(LedgerError::DuplicateLogin(login.to_string())));

        let service = UserService::new(Arc::new(repo)).with_hash_cost(4);
        assert!(matches!(
            service.register("alice", "secret").await,
            Err(LedgerError::DuplicateLogin(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_credentials() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_create_with_balance().never();

        let service = UserService::new(Arc::new(repo)).with_hash_cost(4);
        assert!(matches!(
            service.register("", "secret").await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            service.register("alice", "").await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login() {
        let mut repo = MockUserRepositoryTrait::new();
        repo.expect_find_by_login().returning(|login| {
            if login == "alice" {
                Ok(Some(stored_user("secret")))
            } else {
                Ok(None)
            }
        });

        let service = UserService::new(Arc::new(repo));

        let user = service.login("alice", "secret").await.unwrap();
        assert_eq!(user.id, 7);

        assert!(matches!(
            service.login("alice", "wrong").await,
            Err(LedgerError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("bob", "secret").await,
            Err(LedgerError::InvalidCredentials)
        ));
    }
}
