//! Gophermart 积分服务
//!
//! 启动 REST API，并在后台运行订单对账 Worker

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use loyalty_ledger::{HttpAccrualClient, OrderRepository, ReconcileWorker};
use loyalty_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use gophermart_api::{AppState, auth::JwtConfig, cli::Cli, routes};

const DEFAULT_SECRET: &str = "gophermart-dev-secret-change-in-production";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. 配置：文件和 GOPHERMART_ 环境变量，命令行参数最后覆盖
    let mut config = AppConfig::load("gophermart").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    cli.apply(&mut config)?;

    // 2. 可观测性
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting gophermart...");
    info!(environment = %config.environment, "Configuration loaded");

    if config.is_production() && config.auth.secret == DEFAULT_SECRET {
        warn!("生产环境仍在使用默认 JWT 密钥，请通过 GOPHERMART_AUTH__SECRET 设置");
    }

    // 3. 数据库
    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }
    info!("Database connection established");

    // 4. 对账 Worker
    let worker = if config.reconcile.enabled {
        let order_repo = Arc::new(OrderRepository::new(db.pool().clone()));
        let accrual = Arc::new(HttpAccrualClient::new(
            &config.accrual,
            config.reconcile.default_retry_after(),
        )?);
        info!(accrual = %config.accrual.base_url, "ReconcileWorker started");
        Some(ReconcileWorker::new(order_repo, accrual, &config.reconcile).start())
    } else {
        info!("ReconcileWorker disabled");
        None
    };

    // 5. HTTP 服务
    let state = AppState::new(db.clone(), JwtConfig::from(&config.auth));
    let app = routes::app(state, config.server.request_timeout());

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(worker) = worker {
        worker.stop().await;
        info!("ReconcileWorker stopped");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
