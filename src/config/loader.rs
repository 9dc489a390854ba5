//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::{validate_config, CheckerConfig};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

/// `${VAR_NAME}` 占位符
fn env_var_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}"))
        .as_ref()
        .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)).into())
}

/// 配置加载器trait，定义配置加载接口
///
/// 加载只负责解析；命令行覆盖完成后再统一调用 [`ConfigLoader::validate`]。
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<CheckerConfig>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<CheckerConfig>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    ///
    /// # 返回
    /// * `Result<CheckerConfig>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str) -> Result<CheckerConfig>;

    /// 验证配置
    ///
    /// # 参数
    /// * `config` - 要验证的配置
    ///
    /// # 返回
    /// * `Result<()>` - 验证结果
    fn validate(&self, config: &CheckerConfig) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的 `${VAR_NAME}` 环境变量，任一变量缺失即报错
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        let pattern = env_var_pattern()?;

        if let Some(missing) = pattern
            .captures_iter(content)
            .map(|captures| captures[1].to_string())
            .find(|name| std::env::var(name).is_err())
        {
            return Err(ConfigError::EnvVarError { var: missing }.into());
        }

        let substituted = pattern.replace_all(content, |captures: &Captures| {
            std::env::var(&captures[1]).unwrap_or_default()
        });
        Ok(substituted.into_owned())
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<CheckerConfig> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: CheckerConfig = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(config.normalized())
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<CheckerConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {}", e)))?;

        let config = self.parse_toml(&content)?;

        log::info!("成功加载配置文件: {}", path.display());
        log::debug!("配置内容: {:?}", config);

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<CheckerConfig> {
        let config = self.parse_toml(content)?;
        log::debug!("成功解析配置字符串");
        Ok(config)
    }

    fn validate(&self, config: &CheckerConfig) -> Result<()> {
        validate_config(config).map_err(Into::into)
    }
}
