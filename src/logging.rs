//! 日志系统模块
//!
//! 提供结构化日志配置和管理功能。日志只写入stderr或文件，stdout专用于报告输出。

use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_log::AsTrace;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 全局日志初始化状态
#[derive(Debug, Default)]
struct GlobalLoggingState {
    /// 是否已初始化
    initialized: bool,
    /// 当前配置
    current_config: Option<LogConfig>,
}

/// 全局日志状态管理器
static GLOBAL_LOGGING_STATE: OnceLock<Mutex<GlobalLoggingState>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选，设置后不再输出到stderr）
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 模块级别日志控制
    pub module_levels: HashMap<String, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            file_path: None,
            json_format: false,
            module_levels: HashMap::new(),
        }
    }
}

/// 日志系统管理器
#[derive(Debug)]
pub struct LoggingSystem {
    /// 配置
    config: LogConfig,
}

impl LoggingSystem {
    /// 初始化日志系统
    ///
    /// 多次调用是安全的，只有第一次真正安装subscriber。
    ///
    /// # 参数
    /// * `config` - 日志配置
    ///
    /// # 返回
    /// * `Result<LoggingSystem, anyhow::Error>` - 初始化结果
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let state_mutex =
            GLOBAL_LOGGING_STATE.get_or_init(|| Mutex::new(GlobalLoggingState::default()));

        let mut state = state_mutex
            .lock()
            .map_err(|e| anyhow::anyhow!("日志状态锁已损坏: {}", e))?;

        if !state.initialized {
            Self::perform_initialization(&config)?;
            state.initialized = true;
            state.current_config = Some(config.clone());
        }

        Ok(Self { config })
    }

    /// 当前实例的配置
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// 执行实际的日志系统初始化
    fn perform_initialization(config: &LogConfig) -> anyhow::Result<()> {
        Self::init_log_tracer()?;
        Self::init_tracing_subscriber(config)
    }

    /// 初始化 LogTracer（log crate 到 tracing 的桥接）
    fn init_log_tracer() -> anyhow::Result<()> {
        use tracing_log::LogTracer;

        static LOG_TRACER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

        let result = LOG_TRACER_INIT.get_or_init(|| LogTracer::init().map_err(|e| e.to_string()));

        result
            .as_ref()
            .map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))?;
        Ok(())
    }

    /// 构建环境过滤器
    fn build_env_filter(config: &LogConfig) -> anyhow::Result<EnvFilter> {
        let mut env_filter = EnvFilter::builder()
            .with_default_directive(config.level.as_trace().into())
            .from_env_lossy();

        for (module, level) in &config.module_levels {
            let directive = format!("{}={}", module, Self::level_to_string(*level))
                .parse()
                .map_err(|e| anyhow::anyhow!("无效的模块日志级别 {}: {}", module, e))?;
            env_filter = env_filter.add_directive(directive);
        }

        Ok(env_filter)
    }

    /// 构建日志输出目标：设置了文件路径时写入文件（覆盖），否则写入stderr
    fn build_writer(config: &LogConfig) -> anyhow::Result<BoxMakeWriter> {
        match &config.file_path {
            Some(file_path) => {
                let file = std::fs::File::create(file_path).map_err(|e| {
                    anyhow::anyhow!("创建日志文件失败 {}: {}", file_path.display(), e)
                })?;
                Ok(BoxMakeWriter::new(Mutex::new(file)))
            }
            None => Ok(BoxMakeWriter::new(std::io::stderr)),
        }
    }

    /// 初始化 tracing subscriber
    fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
        let env_filter = Self::build_env_filter(config)?;

        let layer = fmt::layer()
            .with_writer(Self::build_writer(config)?)
            .with_ansi(config.file_path.is_none())
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_target(false);
        let fmt_layer = if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        };

        match registry().with(env_filter).with(fmt_layer).try_init() {
            Ok(()) => {
                tracing::debug!("日志配置: {:?}", config);
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("a global default trace dispatcher has already been set") {
                    // 已由其他组件初始化（例如测试环境）
                    Ok(())
                } else {
                    Err(anyhow::anyhow!(
                        "tracing subscriber初始化失败: {}",
                        error_msg
                    ))
                }
            }
        }
    }

    /// 将 log::LevelFilter 转换为字符串
    fn level_to_string(level: LevelFilter) -> &'static str {
        match level {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }

    /// 检查日志系统是否已初始化
    pub fn is_initialized() -> bool {
        GLOBAL_LOGGING_STATE
            .get()
            .and_then(|state| state.lock().ok().map(|s| s.initialized))
            .unwrap_or(false)
    }

    /// 获取当前日志配置（如果已初始化）
    pub fn current_config() -> Option<LogConfig> {
        GLOBAL_LOGGING_STATE
            .get()
            .and_then(|state| state.lock().ok().and_then(|s| s.current_config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn create_test_config() -> LogConfig {
        LogConfig {
            level: LevelFilter::Info,
            ..Default::default()
        }
    }

    #[test]
    #[serial]
    fn test_logging_system_repeated_initialization() {
        let first = LoggingSystem::setup_logging(create_test_config());
        assert!(first.is_ok());
        assert!(LoggingSystem::is_initialized());

        // 第二次初始化不会重复安装subscriber
        let mut config = create_test_config();
        config.json_format = true;
        let second = LoggingSystem::setup_logging(config);
        assert!(second.is_ok());
        assert!(second.unwrap().config().json_format);
        assert!(LoggingSystem::current_config().is_some());
    }

    #[test]
    fn test_module_level_directives() {
        let mut config = create_test_config();
        config
            .module_levels
            .insert("http_checker::health".to_string(), LevelFilter::Debug);
        config
            .module_levels
            .insert("reqwest".to_string(), LevelFilter::Warn);

        assert!(LoggingSystem::build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(LoggingSystem::level_to_string(LevelFilter::Debug), "debug");
        assert_eq!(LoggingSystem::level_to_string(LevelFilter::Off), "off");
        assert_eq!(
            LevelFilter::Warn.as_trace(),
            tracing_subscriber::filter::LevelFilter::WARN
        );
    }

    #[test]
    fn test_file_writer_creates_log_file() {
        use std::io::Write;
        use tracing_subscriber::fmt::MakeWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("http-checker.log");
        let config = LogConfig {
            file_path: Some(path.clone()),
            ..create_test_config()
        };

        let writer = LoggingSystem::build_writer(&config).unwrap();
        writer.make_writer().write_all(b"probe finished\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "probe finished\n");
    }

    #[test]
    fn test_file_writer_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            file_path: Some(dir.path().join("missing").join("http-checker.log")),
            ..create_test_config()
        };

        let err = LoggingSystem::build_writer(&config).unwrap_err();
        assert!(err.to_string().contains("创建日志文件失败"));
    }

    #[test]
    fn test_default_config_is_quiet() {
        let config = LogConfig::default();
        assert_eq!(config.level, LevelFilter::Warn);
        assert!(config.file_path.is_none());
        assert!(!config.json_format);
    }
}
