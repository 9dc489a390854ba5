//! 可读文本格式

use crate::health::{ProbeOutcome, ProbeStatus, Severity};
use crate::report::NO_DATA;

/// 超时结果在耗时位置显示的标记
pub const TIMED_OUT_MARKER: &str = "timed out";

/// 渲染单个结局为一行文本
pub fn describe(outcome: &ProbeOutcome, expected_codes: &[u16]) -> String {
    let expected = expected_codes
        .iter()
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let (got, time) = match &outcome.result.status {
        ProbeStatus::Response(code) => (
            code.to_string(),
            outcome
                .result
                .elapsed_secs()
                .map(|secs| format!("{secs:.3}s"))
                .unwrap_or_else(|| TIMED_OUT_MARKER.to_string()),
        ),
        ProbeStatus::Timeout => (
            outcome
                .result
                .status_code()
                .map(|code| code.to_string())
                .unwrap_or_default(),
            TIMED_OUT_MARKER.to_string(),
        ),
        ProbeStatus::Error(message) => (format!("error ({message})"), "n/a".to_string()),
    };

    format!(
        "tested {} got: {}, expected {}. Time to serve: {} Status {}.",
        outcome.url(),
        got,
        expected,
        time,
        outcome.severity
    )
}

/// 渲染正文：Unknown 排在最前，其余保持目标顺序
pub(crate) fn render_lines(
    all: &[ProbeOutcome],
    included: &[&ProbeOutcome],
    expected_codes: &[u16],
) -> Vec<String> {
    if all.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let (unknown, rest): (Vec<&ProbeOutcome>, Vec<&ProbeOutcome>) = included
        .iter()
        .copied()
        .partition(|outcome| outcome.severity == Severity::Unknown);

    unknown
        .into_iter()
        .chain(rest)
        .map(|outcome| describe(outcome, expected_codes))
        .collect()
}
