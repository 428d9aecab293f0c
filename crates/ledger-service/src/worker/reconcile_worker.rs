//! 订单对账 Worker
//!
//! 以固定间隔循环：
//! 1. 认领待对账订单（NEW 推进为 PROCESSING，返回全部 PROCESSING）
//! 2. 逐个向 accrual 服务查询结论
//! 3. INVALID / PROCESSED 落库，PROCESSED 同事务入账
//!
//! 遇到限流时整个循环暂停 Retry-After 给出的时长（至少 1 秒），然后重新查询被限流的订单。
//! 单个订单的查询或落库失败只记录日志，留待下一轮重试。

use std::sync::Arc;
use std::time::{Duration, Instant};

use loyalty_shared::config::ReconcileConfig;
use loyalty_shared::observability::metrics;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::accrual::{AccrualClient, AccrualReply, AccrualStatus, AccrualVerdict};
use crate::error::Result;
use crate::models::Order;
use crate::repository::OrderRepositoryTrait;

const WORKER_NAME: &str = "reconcile_worker";

/// 限流暂停的下限，避免 `Retry-After: 0` 时空转
const MIN_THROTTLE_PAUSE: Duration = Duration::from_secs(1);

/// 单轮对账统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// 本轮认领的订单数
    pub claimed: usize,
    /// 迁移到 PROCESSED 的订单数
    pub processed: usize,
    /// 迁移到 INVALID 的订单数
    pub invalid: usize,
    /// accrual 尚无结论（或未登记）的订单数
    pub pending: usize,
    /// 限流暂停次数
    pub throttled: usize,
    /// 查询或落库失败的订单数
    pub failed: usize,
    /// 是否因停机信号提前结束
    pub interrupted: bool,
}

impl CycleReport {
    pub fn is_idle(&self) -> bool {
        self.claimed == 0
    }
}

/// 订单对账 Worker
pub struct ReconcileWorker<OR, AC>
where
    OR: OrderRepositoryTrait,
    AC: AccrualClient,
{
    order_repo: Arc<OR>,
    accrual: Arc<AC>,
    /// 两轮之间的间隔
    poll_interval: Duration,
}

impl<OR, AC> ReconcileWorker<OR, AC>
where
    OR: OrderRepositoryTrait + 'static,
    AC: AccrualClient + 'static,
{
    pub fn new(order_repo: Arc<OR>, accrual: Arc<AC>, config: &ReconcileConfig) -> Self {
        Self {
            order_repo,
            accrual,
            poll_interval: config.poll_interval(),
        }
    }

    /// 在后台任务中启动，返回可用于停机的句柄
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        WorkerHandle { shutdown_tx, join }
    }

    /// 主循环：持续对账直到收到停机信号
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(poll_interval = ?self.poll_interval, "ReconcileWorker 已启动");

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_cycle(&mut shutdown).await {
                Ok(report) if report.is_idle() => debug!("本轮没有待对账订单"),
                Ok(report) => info!(?report, "本轮对账完成"),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, code = e.error_code(), "认领待对账订单暂时失败，等待下一轮")
                }
                Err(e) => error!(error = %e, code = e.error_code(), "认领待对账订单失败，等待下一轮"),
            }

            metrics::set_worker_last_run(WORKER_NAME);

            if sleep_or_shutdown(self.poll_interval, &mut shutdown).await {
                break;
            }
        }

        info!("ReconcileWorker 已停止");
    }

    /// 执行一轮对账
    ///
    /// 仅认领阶段的存储错误会返回 Err，单个订单的失败计入报告
    pub async fn run_cycle(&self, shutdown: &mut watch::Receiver<bool>) -> Result<CycleReport> {
        let orders = self.order_repo.claim_pending().await?;
        let mut report = CycleReport {
            claimed: orders.len(),
            ..Default::default()
        };

        let mut idx = 0;
        while idx < orders.len() {
            if *shutdown.borrow() {
                report.interrupted = true;
                break;
            }

            let order = &orders[idx];
            let started = Instant::now();
            let reply = self.accrual.query(&order.number).await;
            let elapsed = started.elapsed().as_secs_f64();

            match reply {
                Ok(AccrualReply::RetryAfter(delay)) => {
                    let delay = delay.max(MIN_THROTTLE_PAUSE);
                    metrics::record_accrual_query("throttled", elapsed);
                    metrics::record_accrual_throttle(delay.as_secs());
                    report.throttled += 1;
                    warn!(order = %order.number, delay = ?delay, "accrual 服务限流，暂停对账");

                    if sleep_or_shutdown(delay, shutdown).await {
                        report.interrupted = true;
                        break;
                    }
                    // 暂停结束后重新查询同一订单
                    continue;
                }
                Ok(AccrualReply::NotRegistered) => {
                    metrics::record_accrual_query("not_registered", elapsed);
                    debug!(order = %order.number, "订单尚未在 accrual 服务登记");
                    report.pending += 1;
                }
                Ok(AccrualReply::Verdict(verdict)) => {
                    self.apply_verdict(order, verdict, elapsed, &mut report).await;
                }
                Err(e) => {
                    metrics::record_accrual_query("error", elapsed);
                    warn!(order = %order.number, error = %e, "accrual 查询失败");
                    report.failed += 1;
                }
            }

            idx += 1;
        }

        Ok(report)
    }

    async fn apply_verdict(
        &self,
        order: &Order,
        verdict: AccrualVerdict,
        elapsed: f64,
        report: &mut CycleReport,
    ) {
        match verdict.status {
            AccrualStatus::Registered | AccrualStatus::Processing => {
                metrics::record_accrual_query("pending", elapsed);
                report.pending += 1;
            }
            AccrualStatus::Invalid => {
                metrics::record_accrual_query("invalid", elapsed);
                match self.order_repo.mark_invalid(&order.number).await {
                    Ok(true) => {
                        metrics::record_order_reconciled("INVALID");
                        info!(order = %order.number, "订单被判定为 INVALID");
                        report.invalid += 1;
                    }
                    Ok(false) => debug!(order = %order.number, "订单已处于终态，忽略"),
                    Err(e) => {
                        error!(order = %order.number, error = %e, "标记 INVALID 失败");
                        report.failed += 1;
                    }
                }
            }
            AccrualStatus::Processed => {
                metrics::record_accrual_query("processed", elapsed);
                let accrual = verdict.accrual.unwrap_or_default();
                match self.order_repo.mark_processed(&order.number, accrual).await {
                    Ok(true) => {
                        metrics::record_order_reconciled("PROCESSED");
                        info!(
                            order = %order.number,
                            login = %order.login,
                            accrual = %accrual,
                            "订单已入账"
                        );
                        report.processed += 1;
                    }
                    Ok(false) => debug!(order = %order.number, "订单已处于终态，忽略"),
                    Err(e) => {
                        error!(order = %order.number, error = %e, "标记 PROCESSED 失败");
                        report.failed += 1;
                    }
                }
            }
        }
    }
}

/// 睡眠指定时长，期间收到停机信号则提前返回 true
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => {
                // 发送端被丢弃同样视为停机
                if changed.is_err() || *shutdown.borrow_and_update() {
                    return true;
                }
            }
        }
    }
}

/// 后台 Worker 句柄
pub struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// 发出停机信号并等待当前查询结束
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "ReconcileWorker 任务异常退出");
        }
    }
}
