//! JSON格式
//!
//! 以URL为键的对象，只包含通过展示阈值的结果。

use crate::health::{ProbeOutcome, ProbeStatus};
use crate::report::human::TIMED_OUT_MARKER;
use serde_json::{json, Map, Value};

/// 单个结局的JSON表示
pub fn entry(outcome: &ProbeOutcome) -> Value {
    let severity = outcome.severity.name();
    match &outcome.result.status {
        ProbeStatus::Error(message) => json!({
            "error": message,
            "severity": severity,
        }),
        _ => {
            let elapsed = match outcome.result.elapsed_secs() {
                Some(secs) => json!((secs * 1000.0).round() / 1000.0),
                None => json!(TIMED_OUT_MARKER),
            };
            json!({
                "status_code": outcome.result.status_code(),
                "elapsed_time": elapsed,
                "severity": severity,
            })
        }
    }
}

/// 渲染为格式化的JSON文本
pub(crate) fn render(included: &[&ProbeOutcome]) -> String {
    let map: Map<String, Value> = included
        .iter()
        .map(|outcome| (outcome.url().to_string(), entry(outcome)))
        .collect();
    format!("{:#}", Value::Object(map))
}
