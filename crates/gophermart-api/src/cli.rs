//! 命令行参数
//!
//! 兼容 `-a`/`-d`/`-r` 三个参数及对应的环境变量，优先级高于配置文件

use anyhow::{Context, Result, bail};
use clap::Parser;
use loyalty_shared::config::AppConfig;

/// Gophermart 积分服务
#[derive(Debug, Default, Parser)]
#[command(name = "gophermart", version, about = "Gophermart loyalty points service")]
pub struct Cli {
    /// 服务监听地址，格式 host:port
    #[arg(short = 'a', long = "address", env = "RUN_ADDRESS")]
    pub run_address: Option<String>,

    /// PostgreSQL 连接串
    #[arg(short = 'd', long = "database-uri", env = "DATABASE_URI")]
    pub database_uri: Option<String>,

    /// 积分计算系统地址
    #[arg(short = 'r', long = "accrual-address", env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_address: Option<String>,
}

impl Cli {
    /// 把命令行覆盖项写入配置
    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(address) = &self.run_address {
            let (host, port) = split_address(address)?;
            config.server.host = host;
            config.server.port = port;
        }

        if let Some(uri) = &self.database_uri {
            config.database.url = uri.clone();
        }

        if let Some(accrual) = &self.accrual_address {
            config.accrual.base_url = if accrual.contains("://") {
                accrual.clone()
            } else {
                format!("http://{}", accrual)
            };
        }

        Ok(())
    }
}

/// 拆分 `host:port`，host 为空时监听所有地址
fn split_address(address: &str) -> Result<(String, u16)> {
    let Some((host, port)) = address.rsplit_once(':') else {
        bail!("监听地址缺少端口: {}", address);
    };

    let port = port
        .parse::<u16>()
        .with_context(|| format!("监听端口无效: {}", address))?;

    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "gophermart",
            "-a",
            "localhost:8080",
            "-d",
            "postgres://u:p@db/gophermart",
            "-r",
            "http://accrual:8081",
        ])
        .unwrap();

        assert_eq!(cli.run_address.as_deref(), Some("localhost:8080"));
        assert_eq!(
            cli.database_uri.as_deref(),
            Some("postgres://u:p@db/gophermart")
        );
        assert_eq!(cli.accrual_address.as_deref(), Some("http://accrual:8081"));
    }

    #[test]
    fn test_apply_overrides_config() {
        let cli = Cli {
            run_address: Some("127.0.0.1:9000".to_string()),
            database_uri: Some("postgres://localhost/test".to_string()),
            accrual_address: Some("accrual:8081".to_string()),
        };
        let mut config = AppConfig::default();

        cli.apply(&mut config).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "postgres://localhost/test");
        assert_eq!(config.accrual.base_url, "http://accrual:8081");
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let mut config = AppConfig::default();
        let before = config.server_addr();

        Cli::default().apply(&mut config).unwrap();

        assert_eq!(config.server_addr(), before);
    }

    #[test]
    fn test_split_address() {
        assert_eq!(
            split_address(":8080").unwrap(),
            ("0.0.0.0".to_string(), 8080)
        );
        assert!(split_address("localhost").is_err());
        assert!(split_address("localhost:http").is_err());
    }
}
