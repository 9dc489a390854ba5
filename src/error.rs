//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// http-checker 的主要错误类型
#[derive(Error, Debug)]
pub enum CheckerError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测执行相关错误
    #[error("探测错误: {0}")]
    Probe(#[from] ProbeError),

    /// 检测被中断（在途探测已完成，不输出报告）
    #[error("检测被中断: 已完成 {completed}/{total} 个探测")]
    Interrupted { completed: usize, total: usize },

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 请求头缺少 `:` 分隔符或名称为空
    #[error("请求头格式无效（应为 name:value）: {header}")]
    MalformedHeader { header: String },

    /// schema/域名/页面无法拼接为合法URL
    #[error("无法构造URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// 探测执行错误类型
///
/// 单个目标的传输失败不会以错误形式返回，而是记录为结果中的哨兵值；
/// 这里只包含构建探测器本身时可能出现的问题。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP客户端构建失败
    #[error("HTTP客户端构建失败: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// 无效的HTTP方法
    #[error("无效的HTTP方法: {0}")]
    InvalidMethod(String),

    /// 无效的请求头
    #[error("无效的请求头 {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, CheckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_converts_into_checker_error() {
        let err: CheckerError = ConfigError::MalformedHeader {
            header: "X-Broken".to_string(),
        }
        .into();

        assert!(matches!(err, CheckerError::Config(_)));
        assert!(err.to_string().contains("X-Broken"));
    }

    #[test]
    fn test_interrupted_message_reports_progress() {
        let err = CheckerError::Interrupted {
            completed: 3,
            total: 8,
        };
        assert!(err.to_string().contains("3/8"));
    }
}
