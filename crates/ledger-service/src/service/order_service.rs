//! 订单服务
//!
//! 登记前先校验订单号格式与 Luhn 校验位，校验失败的订单号不会落库

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::Result;
use crate::models::{Order, SubmitOutcome};
use crate::order_number::parse_order_number;
use crate::repository::OrderRepositoryTrait;

/// 订单服务
pub struct OrderService<OR>
where
    OR: OrderRepositoryTrait,
{
    order_repo: Arc<OR>,
}

impl<OR> OrderService<OR>
where
    OR: OrderRepositoryTrait,
{
    pub fn new(order_repo: Arc<OR>) -> Self {
        Self { order_repo }
    }

    /// 登记订单
    ///
    /// 同一订单号重复提交是幂等的：原所有者得到 `OwnedByCaller`，
    /// 其他用户得到 `OwnedByOther`，已有记录不受影响
    #[instrument(skip(self))]
    pub async fn submit_order(&self, login: &str, raw_number: &str) -> Result<SubmitOutcome> {
        let number = parse_order_number(raw_number)?;
        let outcome = self.order_repo.register_if_new(login, &number).await?;

        if outcome == SubmitOutcome::Created {
            info!(order = %number, "订单已登记");
        }
        Ok(outcome)
    }

    /// 查询用户订单，按登记时间升序
    #[instrument(skip(self))]
    pub async fn list_orders(&self, login: &str) -> Result<Vec<Order>> {
        self.order_repo.list_by_user(login).await
    }
}
