//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::{AlertLevel, CheckerConfig, OutputFormat};
use crate::logging::LogConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// `--help` 末尾的退出码说明与示例
const AFTER_HELP: &str = "\
退出码:
  0  OK        全部目标符合期望
  1  WARNING   存在警告
  2  CRITICAL  存在不符合期望的状态码或超时
  3  UNKNOWN   存在传输层失败；参数错误、配置错误和中断同样以3退出

示例: http-checker -m get -s http,https -b www.example1.com,www.example2.com -p /index.html,/p/p2";

/// http-checker - 组合 schema、域名和页面进行HTTP检测，退出码兼容Nagios
#[derive(Parser, Debug, Clone)]
#[command(
    name = "http-checker",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None,
    after_help = AFTER_HELP
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "TOML配置文件路径，命令行参数优先",
        env = "HTTP_CHECKER_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// HTTP方法
    #[arg(short, long, value_name = "METHOD", help = "HTTP方法: get, post, head")]
    pub method: Option<String>,

    /// schema列表
    #[arg(
        short,
        long = "schema",
        value_name = "SCHEMA",
        value_delimiter = ',',
        help = "schema，逗号分隔: http,https"
    )]
    pub schemas: Vec<String>,

    /// 基础域名列表
    #[arg(
        short,
        long = "base-domains",
        value_name = "DOMAIN",
        value_delimiter = ',',
        help = "基础域名，逗号分隔"
    )]
    pub base_domains: Vec<String>,

    /// 页面列表
    #[arg(
        short,
        long,
        value_name = "PAGE",
        value_delimiter = ',',
        help = "要检测的页面，逗号分隔"
    )]
    pub pages: Vec<String>,

    /// 查询字符串
    #[arg(short, long, value_name = "QUERY", help = "附加到每个URL的查询字符串")]
    pub query: Option<String>,

    /// 请求头列表
    #[arg(
        short = 'H',
        long,
        value_name = "NAME:VALUE",
        value_delimiter = ',',
        help = "请求头，逗号分隔，格式 name:value"
    )]
    pub headers: Vec<String>,

    /// 连接超时时间（秒）
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        help = "连接超时时间（秒），默认2",
        env = "HTTP_CHECKER_TIMEOUT"
    )]
    pub timeout: Option<u64>,

    /// 期望的状态码
    #[arg(
        short,
        long,
        value_name = "CODE",
        value_delimiter = ',',
        help = "期望的HTTP状态码，逗号分隔，默认200"
    )]
    pub expected_codes: Vec<u16>,

    /// 最大并发探测数
    #[arg(
        short,
        long,
        value_name = "COUNT",
        help = "最大并发探测数，默认1",
        env = "HTTP_CHECKER_CONCURRENCY"
    )]
    pub concurrency: Option<usize>,

    /// 输出格式
    #[arg(short, long, value_enum, help = "输出格式，默认human")]
    pub output_format: Option<OutputFormat>,

    /// 报告展示阈值
    #[arg(short, long, value_enum, help = "报告展示阈值，默认info（不影响退出码）")]
    pub alert_level: Option<AlertLevel>,

    /// 是否校验TLS证书
    #[arg(long, help = "校验TLS证书（默认不校验）")]
    pub verify_tls: bool,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "warn",
        help = "日志级别",
        env = "HTTP_CHECKER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 是否以JSON格式输出日志
    #[arg(long, help = "以JSON格式输出日志")]
    pub log_json: bool,

    /// 日志文件路径
    #[arg(
        long,
        value_name = "FILE",
        help = "把日志写入文件而不是stderr",
        env = "HTTP_CHECKER_LOG_FILE"
    )]
    pub log_file: Option<PathBuf>,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出")]
    pub verbose: bool,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl Args {
    /// 由命令行参数构建日志配置
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.effective_log_level(),
            file_path: self.log_file.clone(),
            json_format: self.log_json,
            ..Default::default()
        }
    }

    /// 有效的日志级别，详细模式至少为debug
    pub fn effective_log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            self.log_level.clone().into()
        }
    }

    /// 把命令行参数覆盖到基础配置上
    ///
    /// 列表参数非空时整体替换配置文件中的值。
    pub fn apply_to(&self, mut config: CheckerConfig) -> CheckerConfig {
        if let Some(ref method) = self.method {
            config.method = method.clone();
        }
        if !self.schemas.is_empty() {
            config.schemas = self.schemas.clone();
        }
        if !self.base_domains.is_empty() {
            config.base_domains = self.base_domains.clone();
        }
        if !self.pages.is_empty() {
            config.pages = self.pages.clone();
        }
        if self.query.is_some() {
            config.query = self.query.clone();
        }
        if !self.headers.is_empty() {
            config.headers = self.headers.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if !self.expected_codes.is_empty() {
            config.expected_codes = self.expected_codes.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(alert_level) = self.alert_level {
            config.alert_level = alert_level;
        }
        if self.verify_tls {
            config.verify_tls = true;
        }
        config.normalized()
    }
}
