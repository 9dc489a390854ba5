//! 严重级别的分级与汇总
//!
//! 级别顺序即“更差”的顺序：OK < Warning < Critical < Unknown，
//! 与 Nagios 插件退出码一一对应。

use crate::health::result::{ProbeStatus, RawResult};
use serde::{Deserialize, Serialize};

/// 严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// 状态码符合期望
    #[serde(rename = "OK")]
    Ok,
    /// 警告（当前没有分级路径会产生该级别）
    Warning,
    /// 状态码不符合期望，含超时
    Critical,
    /// 传输层失败，无法判断目标状态
    Unknown,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Severity {
    /// 报告中使用的级别名称
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }

    /// 对应的进程退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    /// 对原始结果分级
    ///
    /// 状态码（超时记为504）在期望集合中为OK，否则为Critical；
    /// 没有状态码的传输错误一律为Unknown。
    pub fn classify(result: &RawResult, expected_codes: &[u16]) -> Self {
        match result.status {
            ProbeStatus::Error(_) => Severity::Unknown,
            _ => match result.status_code() {
                Some(code) if expected_codes.contains(&code) => Severity::Ok,
                _ => Severity::Critical,
            },
        }
    }

    /// 最坏者胜出的汇总，空输入为OK
    pub fn aggregate<I>(severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        severities.into_iter().fold(Severity::Ok, Severity::max)
    }
}
