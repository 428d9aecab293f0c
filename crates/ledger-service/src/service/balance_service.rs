//! 余额服务

use std::sync::Arc;

use loyalty_shared::observability::metrics;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::models::{Balance, Withdrawal, WithdrawOutcome};
use crate::order_number::parse_order_number;
use crate::repository::BalanceRepositoryTrait;

/// 积分金额的小数位数
const POINTS_SCALE: u32 = 2;

/// 余额服务
pub struct BalanceService<BR>
where
    BR: BalanceRepositoryTrait,
{
    balance_repo: Arc<BR>,
}

impl<BR> BalanceService<BR>
where
    BR: BalanceRepositoryTrait,
{
    pub fn new(balance_repo: Arc<BR>) -> Self {
        Self { balance_repo }
    }

    #[instrument(skip(self))]
    pub async fn get_balance(&self, login: &str) -> Result<Balance> {
        self.balance_repo.get_balance(login).await
    }

    /// 提现
    ///
    /// 提现关联的订单号只要求通过 Luhn 校验，不要求已登记
    #[instrument(skip(self))]
    pub async fn withdraw(
        &self,
        login: &str,
        raw_order: &str,
        amount: Decimal,
    ) -> Result<WithdrawOutcome> {
        let order_number = parse_order_number(raw_order)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "提现金额必须大于 0: {}",
                amount
            )));
        }
        // 积分列为 NUMERIC(18,2)，更多小数位会在落库时被四舍五入
        if amount.normalize().scale() > POINTS_SCALE {
            return Err(LedgerError::Validation(format!(
                "提现金额最多保留 {} 位小数: {}",
                POINTS_SCALE, amount
            )));
        }

        let outcome = self
            .balance_repo
            .withdraw(login, &order_number, amount)
            .await?;

        match outcome {
            WithdrawOutcome::Ok => {
                metrics::record_withdrawal("ok");
                info!(order = %order_number, "提现成功");
            }
            WithdrawOutcome::InsufficientFunds => {
                metrics::record_withdrawal("insufficient_funds");
                warn!(order = %order_number, "余额不足，提现被拒绝");
            }
        }
        Ok(outcome)
    }

    /// 查询用户自己的提现记录
    #[instrument(skip(self))]
    pub async fn list_withdrawals(&self, login: &str) -> Result<Vec<Withdrawal>> {
        self.balance_repo.list_withdrawals(login).await
    }
}
