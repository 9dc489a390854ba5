//! HTTP Checker - 组合式HTTP健康检测工具
//!
//! 将 schema × 域名 × 页面 展开为检测目标，支持：
//! - 受并发上限约束的HTTP探测
//! - 按期望状态码分级（OK / WARNING / CRITICAL / UNKNOWN）
//! - 兼容Nagios的退出码与性能数据
//! - human / nagios / json 三种报告格式
//! - 结构化日志记录

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod report;

// 重新导出主要类型
pub use check::{build_executor, run_check, CheckReport};
pub use config::{AlertLevel, CheckerConfig, OutputFormat};
pub use error::{CheckerError, ConfigError, ProbeError};
pub use health::{ProbeExecutor, ProbeOutcome, ProbeTarget, RawResult, Severity};
pub use report::{RenderedReport, ReportRenderer};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
