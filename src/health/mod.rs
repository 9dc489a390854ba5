//! 健康检测模块
//!
//! 提供目标展开、HTTP探测、并发调度、结果分级与汇总功能

pub mod checker;
pub mod result;
pub mod scheduler;
pub mod severity;
pub mod target;

// 重新导出主要类型
pub use checker::{HttpProbeExecutor, ProbeExecutor};
pub use result::{ProbeOutcome, ProbeStatus, RawResult};
pub use scheduler::ProbeScheduler;
pub use severity::Severity;
pub use target::{expand_targets, ProbeTarget};
