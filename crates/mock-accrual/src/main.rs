//! Mock Accrual 服务入口

use clap::Parser;
use mock_accrual::service::{AccrualServiceState, app};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mock-accrual", about = "积分计算服务的本地模拟")]
struct Cli {
    /// 监听地址
    #[arg(short = 'a', long, env = "MOCK_ACCRUAL_ADDRESS", default_value = "127.0.0.1:8081")]
    address: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 优先使用环境变量 RUST_LOG，否则使用命令行参数指定的级别
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .init();

    let listener = TcpListener::bind(&cli.address).await?;
    info!("Mock accrual 服务启动: http://{}", cli.address);

    axum::serve(listener, app(AccrualServiceState::new()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("收到停止信号，Mock accrual 服务退出");
        })
        .await?;

    Ok(())
}
