//! Nagios插件格式
//!
//! 正文按严重程度从高到低排列，最后一行是覆盖全部目标的性能数据。

use crate::health::{ProbeOutcome, Severity};
use crate::report::human;
use crate::report::NO_DATA;
use std::cmp::Reverse;

/// 无耗时数据时使用的性能数据值
const UNKNOWN_VALUE: &str = "U";

/// 由URL生成性能数据标签：去掉schema前缀，`.` 和 `/` 替换为 `_`
pub fn metric_name(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    without_scheme.replace(['.', '/'], "_")
}

/// 需要时给标签加单引号
fn quote_label(label: &str) -> String {
    if label.contains(['=', '\'']) || label.chars().any(char::is_whitespace) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

/// 单个目标的性能数据项
pub fn perfdata_token(outcome: &ProbeOutcome) -> String {
    let label = quote_label(&metric_name(outcome.url()));
    match outcome.result.elapsed_secs() {
        Some(secs) => format!("{label}={secs:.3}s"),
        None => format!("{label}={UNKNOWN_VALUE}"),
    }
}

/// 性能数据行，不受展示阈值影响
pub(crate) fn perfdata(all: &[ProbeOutcome]) -> Option<String> {
    if all.is_empty() {
        return None;
    }
    let tokens: Vec<String> = all.iter().map(perfdata_token).collect();
    Some(format!("| {}", tokens.join(" ")))
}

/// 正文全部被展示阈值过滤时的状态行，例如 `OK - 3 targets checked`
fn summary_line(all: &[ProbeOutcome]) -> String {
    let overall = Severity::aggregate(all.iter().map(|outcome| outcome.severity));
    format!(
        "{} - {} targets checked",
        overall.name().to_uppercase(),
        all.len()
    )
}

/// 渲染正文：严重程度从高到低，同级保持原顺序
pub(crate) fn render_lines(
    all: &[ProbeOutcome],
    included: &[&ProbeOutcome],
    expected_codes: &[u16],
) -> Vec<String> {
    if all.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    if included.is_empty() {
        return vec![summary_line(all)];
    }

    let mut ordered = included.to_vec();
    ordered.sort_by_key(|outcome| Reverse(outcome.severity));
    ordered
        .into_iter()
        .map(|outcome| human::describe(outcome, expected_codes))
        .collect()
}
