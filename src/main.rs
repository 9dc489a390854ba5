//! HTTP Checker 主程序入口
//!
//! 退出码兼容Nagios：0 OK，1 WARNING，2 CRITICAL，3 UNKNOWN

use anyhow::Context;
use clap::Parser;
use http_checker::cli::{Args, CheckCommand, Command};
use http_checker::logging::LoggingSystem;
use http_checker::Severity;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // 参数错误按UNKNOWN处理，--help/--version正常退出
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let exit_code = if e.use_stderr() {
                Severity::Unknown.exit_code()
            } else {
                0
            };
            // 输出失败时没有更好的处理方式
            let _ = e.print();
            std::process::exit(exit_code);
        }
    };

    let logging = LoggingSystem::setup_logging(args.log_config()).context("初始化日志系统失败");
    let _logging_system = match logging {
        Ok(system) => system,
        Err(e) => {
            eprintln!("{}: {:#}", Severity::Unknown.name(), e);
            std::process::exit(Severity::Unknown.exit_code());
        }
    };

    info!("HTTP Checker v{} 启动", http_checker::VERSION);

    let (shutdown_tx, _) = broadcast::channel(1);

    // 设置Ctrl+C信号处理
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("收到中断信号，停止派发新的探测...");
                let _ = shutdown_tx_clone.send(());
            }
            Err(err) => {
                error!("监听中断信号失败: {}", err);
            }
        }
    });

    let command = CheckCommand::new(shutdown_tx);
    match command.execute(&args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("检测失败: {}", e);
            eprintln!("{}: {}", Severity::Unknown.name(), e);
            std::process::exit(Severity::Unknown.exit_code());
        }
    }
}
