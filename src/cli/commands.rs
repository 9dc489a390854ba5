//! 命令处理逻辑
//!
//! 组装配置、执行检测并输出报告

use crate::check::{build_executor, run_check};
use crate::cli::args::Args;
use crate::config::{CheckerConfig, ConfigLoader, TomlConfigLoader};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    ///
    /// # 返回
    /// * `Result<i32>` - 进程退出码
    async fn execute(&self, args: &Args) -> Result<i32>;
}

/// 加载并验证配置：配置文件（可选）→ 命令行覆盖 → 验证
pub async fn load_config(args: &Args) -> Result<CheckerConfig> {
    let loader = TomlConfigLoader::new(true);

    let base = match args.config {
        Some(ref path) => loader.load_from_file(path).await?,
        None => CheckerConfig::default(),
    };

    let config = args.apply_to(base);
    loader.validate(&config)?;

    debug!("生效配置: {:?}", config);
    Ok(config)
}

/// 一次性检测命令
pub struct CheckCommand {
    /// 关闭信号发送器，每次执行时订阅
    shutdown_tx: broadcast::Sender<()>,
}

impl CheckCommand {
    /// 创建检测命令
    pub fn new(shutdown_tx: broadcast::Sender<()>) -> Self {
        Self { shutdown_tx }
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let config = load_config(args).await?;
        info!(
            "检测组合 {} 个，输出格式 {}，展示阈值 {}",
            config.target_count(),
            config.output_format,
            config.alert_level
        );

        let executor = build_executor(&config)?;
        let report = run_check(&config, executor, self.shutdown_tx.subscribe()).await?;

        let rendered = report.rendered.to_string();
        if !rendered.is_empty() {
            println!("{rendered}");
        }

        Ok(report.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::{CheckerError, ConfigError};
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("http-checker").chain(argv.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_load_config_from_cli_only() {
        let args = parse(&["-s", "http", "-b", "example.com", "-p", "/ok,/health"]);
        let config = load_config(&args).await.unwrap();
        assert_eq!(config.target_count(), 2);
    }

    #[tokio::test]
    async fn test_load_config_merges_file_and_cli() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "schemas = [\"http\"]\nbase_domains = [\"example.com\"]\npages = [\"/\"]\noutput_format = \"json\""
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = parse(&["--config", &path, "-p", "/a,/b,/c"]);
        let config = load_config(&args).await.unwrap();

        assert_eq!(config.pages, vec!["/a", "/b", "/c"]);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[tokio::test]
    async fn test_missing_axes_is_config_error() {
        let args = parse(&["-s", "http"]);
        let result = load_config(&args).await;
        assert!(matches!(
            result,
            Err(CheckerError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[tokio::test]
    async fn test_malformed_header_is_config_error() {
        let args = parse(&["-s", "http", "-b", "example.com", "-p", "/", "-H", "broken"]);
        let result = load_config(&args).await;
        assert!(matches!(
            result,
            Err(CheckerError::Config(ConfigError::MalformedHeader { .. }))
        ));
    }

    #[tokio::test]
    async fn test_check_command_against_local_server() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ok")
            .with_status(200)
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/bad")
            .with_status(503)
            .create_async()
            .await;

        let host = server.host_with_port();
        let args = parse(&["-s", "http", "-b", &host, "-p", "/ok,/bad", "-c", "2"]);

        let (shutdown_tx, _) = broadcast::channel(1);
        let exit_code = CheckCommand::new(shutdown_tx).execute(&args).await.unwrap();
        assert_eq!(exit_code, 2);
    }
}
