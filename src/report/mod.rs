//! 报告渲染模块
//!
//! 把分级后的探测结局按输出格式和展示阈值渲染为报告。
//! 渲染是纯函数：不修改输入，也不参与退出码的计算。

pub mod human;
pub mod json;
pub mod nagios;

use crate::config::{AlertLevel, CheckerConfig, OutputFormat};
use crate::health::ProbeOutcome;

/// 没有任何探测结果时输出的文本
pub const NO_DATA: &str = "No probe results.";

/// 渲染完成的报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// 输出格式
    pub format: OutputFormat,
    /// 报告正文各行
    pub lines: Vec<String>,
    /// 性能数据行（仅nagios格式）
    pub perfdata: Option<String>,
}

impl std::fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = self.lines.iter().chain(self.perfdata.iter());
        if let Some(first) = lines.next() {
            f.write_str(first)?;
            for line in lines {
                write!(f, "\n{line}")?;
            }
        }
        Ok(())
    }
}

/// 报告渲染器
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    /// 输出格式
    format: OutputFormat,
    /// 展示阈值
    alert_level: AlertLevel,
    /// 期望的状态码，用于可读文本
    expected_codes: Vec<u16>,
}

impl ReportRenderer {
    /// 创建渲染器
    pub fn new(format: OutputFormat, alert_level: AlertLevel, expected_codes: Vec<u16>) -> Self {
        Self {
            format,
            alert_level,
            expected_codes,
        }
    }

    /// 按配置创建渲染器
    pub fn from_config(config: &CheckerConfig) -> Self {
        Self::new(
            config.output_format,
            config.alert_level,
            config.expected_codes.clone(),
        )
    }

    /// 渲染报告
    ///
    /// # 参数
    /// * `outcomes` - 全部探测结局（按目标顺序）
    ///
    /// # 返回
    /// * `RenderedReport` - 渲染结果
    pub fn render(&self, outcomes: &[ProbeOutcome]) -> RenderedReport {
        let included: Vec<&ProbeOutcome> = outcomes
            .iter()
            .filter(|outcome| self.alert_level.includes(outcome.severity))
            .collect();

        match self.format {
            OutputFormat::Human => RenderedReport {
                format: self.format,
                lines: human::render_lines(outcomes, &included, &self.expected_codes),
                perfdata: None,
            },
            OutputFormat::Nagios => RenderedReport {
                format: self.format,
                lines: nagios::render_lines(outcomes, &included, &self.expected_codes),
                perfdata: nagios::perfdata(outcomes),
            },
            OutputFormat::Json => RenderedReport {
                format: self.format,
                lines: vec![json::render(&included)],
                perfdata: None,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::health::{ProbeOutcome, ProbeTarget, RawResult};
    use std::time::Duration;

    /// 构造给定页面和原始结果的结局
    pub fn outcome(page: &str, result: fn(&str) -> RawResult) -> ProbeOutcome {
        let target = ProbeTarget::new("http", "example.com", page, None).unwrap();
        let raw = result(&target.url);
        ProbeOutcome::classify(target, raw, &[200])
    }

    pub fn ok(url: &str) -> RawResult {
        RawResult::response(url, 200, Duration::from_millis(50))
    }

    pub fn server_error(url: &str) -> RawResult {
        RawResult::response(url, 500, Duration::from_millis(10))
    }

    pub fn timed_out(url: &str) -> RawResult {
        RawResult::timeout(url)
    }

    pub fn refused(url: &str) -> RawResult {
        RawResult::error(url, "Connection refused")
    }
}
