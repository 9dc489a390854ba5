//! 配置数据结构定义
//!
//! 定义探测配置结构体、输出格式、告警阈值和验证逻辑

use crate::error::ConfigError;
use crate::health::Severity;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 支持的HTTP方法
pub const SUPPORTED_METHODS: [&str; 3] = ["GET", "POST", "HEAD"];

/// 支持的schema
pub const SUPPORTED_SCHEMAS: [&str; 2] = ["http", "https"];

/// 报告输出格式
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 每个目标一行的可读文本
    #[default]
    Human,
    /// Nagios插件格式，附带性能数据
    Nagios,
    /// 以URL为键的JSON对象
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Nagios => write!(f, "nagios"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// 报告展示阈值，只决定哪些结果出现在报告正文中，不影响退出码
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// 展示全部结果
    #[default]
    Info,
    /// 展示Warning及更严重的结果
    Warning,
    /// 只展示Critical及更严重的结果
    Critical,
}

impl AlertLevel {
    /// 该阈值下是否展示给定级别；Unknown 总是展示
    pub fn includes(&self, severity: Severity) -> bool {
        if severity == Severity::Unknown {
            return true;
        }
        match self {
            AlertLevel::Info => true,
            AlertLevel::Warning => severity >= Severity::Warning,
            AlertLevel::Critical => severity >= Severity::Critical,
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
        }
    }
}

/// 探测配置
///
/// schema × 域名 × 页面 的组合即为全部探测目标，其余字段由所有目标共享。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckerConfig {
    /// HTTP方法
    #[serde(default = "default_method")]
    pub method: String,
    /// schema列表（http/https）
    #[serde(default)]
    pub schemas: Vec<String>,
    /// 基础域名列表
    #[serde(default)]
    pub base_domains: Vec<String>,
    /// 页面路径列表
    #[serde(default)]
    pub pages: Vec<String>,
    /// 查询字符串（可选）
    pub query: Option<String>,
    /// 请求头，格式为 `name:value`
    #[serde(default)]
    pub headers: Vec<String>,
    /// 连接超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 期望的状态码列表
    #[serde(default = "default_expected_codes")]
    pub expected_codes: Vec<u16>,
    /// 最大并发探测数
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// 输出格式
    #[serde(default)]
    pub output_format: OutputFormat,
    /// 报告展示阈值
    #[serde(default)]
    pub alert_level: AlertLevel,
    /// 是否校验TLS证书，默认关闭
    #[serde(default)]
    pub verify_tls: bool,
}

// 默认值函数
fn default_method() -> String {
    "GET".to_string()
}
fn default_timeout() -> u64 {
    2
}
fn default_expected_codes() -> Vec<u16> {
    vec![200]
}
fn default_max_concurrency() -> usize {
    1
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            schemas: Vec::new(),
            base_domains: Vec::new(),
            pages: Vec::new(),
            query: None,
            headers: Vec::new(),
            timeout_seconds: default_timeout(),
            expected_codes: default_expected_codes(),
            max_concurrency: default_max_concurrency(),
            output_format: OutputFormat::default(),
            alert_level: AlertLevel::default(),
            // 证书校验默认关闭，需要显式开启
            verify_tls: false,
        }
    }
}

impl CheckerConfig {
    /// 规范化配置：方法转大写，各维度去重（保留首次出现的顺序）
    pub fn normalized(mut self) -> Self {
        self.method = self.method.trim().to_uppercase();
        self.schemas = dedup_preserving_order(
            self.schemas.into_iter().map(|s| s.trim().to_lowercase()),
        );
        self.base_domains =
            dedup_preserving_order(self.base_domains.into_iter().map(|d| d.trim().to_string()));
        self.pages = dedup_preserving_order(self.pages);
        self.expected_codes = dedup_preserving_order(self.expected_codes);
        self.query = self.query.filter(|q| !q.trim().is_empty());
        self
    }

    /// 组合数量，解析为相同URL的组合在展开时会合并，实际目标数可能更少
    pub fn target_count(&self) -> usize {
        self.schemas.len() * self.base_domains.len() * self.pages.len()
    }

    /// 解析请求头，按第一个 `:` 拆分为名称和值
    pub fn parsed_headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.headers.iter().map(|h| parse_header(h)).collect()
    }
}

/// 解析单个 `name:value` 请求头，值中的 `:` 原样保留
pub fn parse_header(header: &str) -> Result<(String, String), ConfigError> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::MalformedHeader {
            header: header.to_string(),
        }),
    }
}

fn dedup_preserving_order<T, I>(items: I) -> Vec<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut unique = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置（应先调用 [`CheckerConfig::normalized`]）
///
/// # 返回
/// * `Result<(), ConfigError>` - 验证结果
pub fn validate_config(config: &CheckerConfig) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

    if !SUPPORTED_METHODS.contains(&config.method.as_str()) {
        return invalid(format!(
            "不支持的HTTP方法: {}，支持的方法: {:?}",
            config.method, SUPPORTED_METHODS
        ));
    }

    if config.schemas.is_empty() {
        return invalid("至少需要指定一个schema".to_string());
    }
    for schema in &config.schemas {
        if !SUPPORTED_SCHEMAS.contains(&schema.as_str()) {
            return invalid(format!(
                "不支持的schema: {}，支持的schema: {:?}",
                schema, SUPPORTED_SCHEMAS
            ));
        }
    }

    if config.base_domains.is_empty() {
        return invalid("至少需要指定一个基础域名".to_string());
    }
    if config.base_domains.iter().any(|d| d.is_empty()) {
        return invalid("基础域名不能为空".to_string());
    }

    if config.pages.is_empty() {
        return invalid("至少需要指定一个页面".to_string());
    }

    if config.timeout_seconds == 0 {
        return invalid("超时时间不能为0".to_string());
    }

    if config.max_concurrency == 0 {
        return invalid("最大并发探测数不能为0".to_string());
    }

    if config.expected_codes.is_empty() {
        return invalid("至少需要指定一个期望的状态码".to_string());
    }

    config.parsed_headers()?;

    Ok(())
}
