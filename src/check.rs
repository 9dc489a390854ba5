//! 单次检测流程
//!
//! 目标展开 → 并发探测 → 分级，之后汇总退出状态与渲染报告各自独立进行

use crate::config::CheckerConfig;
use crate::error::Result;
use crate::health::{
    expand_targets, HttpProbeExecutor, ProbeExecutor, ProbeOutcome, ProbeScheduler, Severity,
};
use crate::report::{RenderedReport, ReportRenderer};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

/// 一次检测的完整结果
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// 检测开始时间
    pub started_at: DateTime<Utc>,
    /// 全部探测结局，按目标顺序
    pub outcomes: Vec<ProbeOutcome>,
    /// 汇总后的整体级别，覆盖全部结局而不受展示阈值影响
    pub overall: Severity,
    /// 渲染后的报告
    pub rendered: RenderedReport,
}

impl CheckReport {
    /// 进程退出码
    pub fn exit_code(&self) -> i32 {
        self.overall.exit_code()
    }
}

/// 按配置创建HTTP探测执行器
pub fn build_executor(config: &CheckerConfig) -> Result<Arc<dyn ProbeExecutor>> {
    let headers = config.parsed_headers()?;
    let executor = HttpProbeExecutor::new(
        &config.method,
        &headers,
        Duration::from_secs(config.timeout_seconds),
        crate::health::checker::DEFAULT_RESPONSE_GRACE,
        config.verify_tls,
    )?;
    Ok(Arc::new(executor))
}

/// 执行一次完整检测
///
/// # 参数
/// * `config` - 已验证的配置
/// * `executor` - 探测执行器
/// * `shutdown_rx` - 关闭信号接收器
///
/// # 返回
/// * `Result<CheckReport>` - 检测结果；配置错误或被中断时返回错误
pub async fn run_check(
    config: &CheckerConfig,
    executor: Arc<dyn ProbeExecutor>,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<CheckReport> {
    let started_at = Utc::now();
    let targets = expand_targets(config)?;

    let scheduler = ProbeScheduler::new(executor, config.max_concurrency);
    let results = scheduler.run(&targets, shutdown_rx).await?;

    let outcomes: Vec<ProbeOutcome> = targets
        .into_iter()
        .zip(results)
        .map(|(target, result)| ProbeOutcome::classify(target, result, &config.expected_codes))
        .collect();

    let overall = Severity::aggregate(outcomes.iter().map(|outcome| outcome.severity));
    let rendered = ReportRenderer::from_config(config).render(&outcomes);

    info!(
        "检测完成: {} 个目标，整体状态 {}，耗时 {}ms",
        outcomes.len(),
        overall,
        (Utc::now() - started_at).num_milliseconds()
    );

    Ok(CheckReport {
        started_at,
        outcomes,
        overall,
        rendered,
    })
}
