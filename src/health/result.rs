//! 探测结果数据结构
//!
//! 定义单次探测的原始结果以及分级后的探测结局

use crate::health::severity::Severity;
use crate::health::target::ProbeTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 连接超时时使用的替代状态码（HTTP 504 Gateway Timeout）
pub const TIMEOUT_STATUS_CODE: u16 = 504;

/// 探测的原始状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ProbeStatus {
    /// 收到HTTP响应
    Response(u16),
    /// 连接或响应超时
    Timeout,
    /// 其他传输层失败（DNS、连接拒绝、TLS等）
    Error(String),
}

/// 单个目标的原始探测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// 实际请求的URL
    pub url: String,
    /// 探测状态
    pub status: ProbeStatus,
    /// 耗时（超时或错误时为空）
    #[serde(with = "duration_serde")]
    pub elapsed: Option<Duration>,
}

impl RawResult {
    /// 创建收到响应的结果
    pub fn response(url: impl Into<String>, status_code: u16, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            status: ProbeStatus::Response(status_code),
            elapsed: Some(elapsed),
        }
    }

    /// 创建超时结果
    pub fn timeout(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ProbeStatus::Timeout,
            elapsed: None,
        }
    }

    /// 创建传输错误结果
    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ProbeStatus::Error(message.into()),
            elapsed: None,
        }
    }

    /// 用于比对期望值的状态码，超时按504处理，传输错误没有状态码
    pub fn status_code(&self) -> Option<u16> {
        match self.status {
            ProbeStatus::Response(code) => Some(code),
            ProbeStatus::Timeout => Some(TIMEOUT_STATUS_CODE),
            ProbeStatus::Error(_) => None,
        }
    }

    /// 是否为超时结果
    pub fn is_timeout(&self) -> bool {
        matches!(self.status, ProbeStatus::Timeout)
    }

    /// 传输错误信息
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ProbeStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// 耗时（秒）
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.elapsed.map(|d| d.as_secs_f64())
    }
}

/// 分级完成的探测结局，渲染与汇总共同的输入单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// 探测目标
    pub target: ProbeTarget,
    /// 原始结果
    pub result: RawResult,
    /// 严重级别
    pub severity: Severity,
}

impl ProbeOutcome {
    /// 对原始结果分级并组装结局
    pub fn classify(target: ProbeTarget, result: RawResult, expected_codes: &[u16]) -> Self {
        let severity = Severity::classify(&result, expected_codes);
        Self {
            target,
            result,
            severity,
        }
    }

    /// 目标URL
    pub fn url(&self) -> &str {
        &self.result.url
    }
}

/// `Option<Duration>` 以毫秒序列化
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
