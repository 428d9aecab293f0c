//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use loyalty_ledger::{
    BalanceRepository, BalanceService, OrderRepository, OrderService, UserRepository, UserService,
};
use loyalty_shared::database::Database;

use crate::auth::{JwtConfig, JwtManager};

/// Axum 应用共享状态
///
/// 服务实例通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: Arc<UserService<UserRepository>>,
    pub orders: Arc<OrderService<OrderRepository>>,
    pub balances: Arc<BalanceService<BalanceRepository>>,
    pub jwt_manager: Arc<JwtManager>,
}

impl AppState {
    /// 基于数据库连接和 JWT 配置装配所有服务
    pub fn new(db: Database, jwt_config: JwtConfig) -> Self {
        let pool = db.pool().clone();

        Self {
            users: Arc::new(UserService::new(Arc::new(UserRepository::new(pool.clone())))),
            orders: Arc::new(OrderService::new(Arc::new(OrderRepository::new(
                pool.clone(),
            )))),
            balances: Arc::new(BalanceService::new(Arc::new(BalanceRepository::new(pool)))),
            jwt_manager: Arc::new(JwtManager::new(jwt_config)),
            db,
        }
    }

    /// 替换用户服务（测试中用于降低 bcrypt cost）
    pub fn with_user_service(mut self, users: UserService<UserRepository>) -> Self {
        self.users = Arc::new(users);
        self
    }
}
