//! 探测任务调度器模块
//!
//! 在并发上限内执行一批探测任务，全部完成后一次性返回结果

use crate::error::{CheckerError, Result};
use crate::health::checker::ProbeExecutor;
use crate::health::result::RawResult;
use crate::health::target::ProbeTarget;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 单批次探测调度器
///
/// 调度循环只负责获取并发许可并派发任务，本身不执行探测。
/// 许可随任务结束（包括panic）自动归还。
pub struct ProbeScheduler {
    /// 探测执行器
    executor: Arc<dyn ProbeExecutor>,
    /// 最大并发探测数
    max_concurrency: usize,
}

impl ProbeScheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    /// * `executor` - 探测执行器
    /// * `max_concurrency` - 最大并发探测数，小于1时按1处理
    pub fn new(executor: Arc<dyn ProbeExecutor>, max_concurrency: usize) -> Self {
        Self {
            executor,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 最大并发探测数
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// 执行全部探测并等待完成
    ///
    /// # 参数
    /// * `targets` - 探测目标，结果按相同顺序返回
    /// * `shutdown_rx` - 关闭信号接收器；收到信号后停止派发，等待在途探测结束
    ///
    /// # 返回
    /// * `Result<Vec<RawResult>>` - 每个目标恰好一个结果；被中断时返回 `Interrupted`
    pub async fn run(
        &self,
        targets: &[ProbeTarget],
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<Vec<RawResult>> {
        let total = targets.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let results: Arc<Mutex<Vec<Option<RawResult>>>> = Arc::new(Mutex::new(vec![None; total]));
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(total);
        let mut interrupted = false;
        // 发送端全部关闭后不再监听关闭信号
        let mut listen_shutdown = true;

        info!(
            "开始探测，目标数量: {}，最大并发: {}",
            total, self.max_concurrency
        );

        for (index, target) in targets.iter().enumerate() {
            let permit = loop {
                tokio::select! {
                    biased;
                    signal = shutdown_rx.recv(), if listen_shutdown => match signal {
                        Err(broadcast::error::RecvError::Closed) => listen_shutdown = false,
                        _ => break None,
                    },
                    permit = Arc::clone(&semaphore).acquire_owned() => break permit.ok(),
                }
            };

            let Some(permit) = permit else {
                warn!("收到中断信号，停止派发剩余 {} 个探测", total - index);
                interrupted = true;
                break;
            };

            debug!("派发探测: {}", target.url);

            let executor = Arc::clone(&self.executor);
            let results = Arc::clone(&results);
            let target = target.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let result = executor.execute(&target).await;
                let mut slots = results.lock().await;
                slots[index] = Some(result);
            }));
        }

        // 等待所有已派发的探测完成
        let dispatched = tasks.len();
        for outcome in futures::future::join_all(tasks).await {
            if let Err(e) = outcome {
                error!("探测任务异常退出: {}", e);
            }
        }

        let slots = std::mem::take(&mut *results.lock().await);

        if interrupted {
            let completed = slots.iter().filter(|slot| slot.is_some()).count();
            return Err(CheckerError::Interrupted { completed, total });
        }

        let collected: Vec<RawResult> = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| RawResult::error(&target.url, "probe task aborted"))
            })
            .collect();

        info!("探测完成，共 {} 个", dispatched);
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 记录同时在途探测数量峰值的执行器
    struct CountingExecutor {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingExecutor {
        fn new(delay: Duration) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl ProbeExecutor for CountingExecutor {
        async fn execute(&self, target: &ProbeTarget) -> RawResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            RawResult::response(&target.url, 200, self.delay)
        }
    }

    /// 对特定页面panic的执行器
    struct PanickingExecutor;

    #[async_trait]
    impl ProbeExecutor for PanickingExecutor {
        async fn execute(&self, target: &ProbeTarget) -> RawResult {
            if target.page == "/boom" {
                panic!("transport exploded");
            }
            RawResult::response(&target.url, 200, Duration::from_millis(1))
        }
    }

    fn create_targets(count: usize) -> Vec<ProbeTarget> {
        (0..count)
            .map(|i| ProbeTarget::new("http", "example.com", &format!("/p{i}"), None).unwrap())
            .collect()
    }

    async fn run_with(
        executor: Arc<dyn ProbeExecutor>,
        max_concurrency: usize,
        targets: &[ProbeTarget],
    ) -> Vec<RawResult> {
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        ProbeScheduler::new(executor, max_concurrency)
            .run(targets, shutdown_rx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_respected() {
        let targets = create_targets(8);
        for max_concurrency in [1, 3, 8, 20] {
            let executor = Arc::new(CountingExecutor::new(Duration::from_millis(20)));
            let results = run_with(executor.clone(), max_concurrency, &targets).await;

            assert_eq!(results.len(), targets.len());
            assert_eq!(executor.calls.load(Ordering::SeqCst), targets.len());
            let peak = executor.peak.load(Ordering::SeqCst);
            assert!(
                peak <= max_concurrency,
                "peak {peak} exceeded cap {max_concurrency}"
            );
        }
    }

    #[tokio::test]
    async fn test_single_worker_is_sequential() {
        let targets = create_targets(5);
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(5)));
        run_with(executor.clone(), 1, &targets).await;
        assert_eq!(executor.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unbounded_dispatches_everything_at_once() {
        let targets = create_targets(6);
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(100)));
        run_with(executor.clone(), 100, &targets).await;
        assert_eq!(executor.peak.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_results_follow_target_order() {
        let targets = create_targets(10);
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(1)));
        let results = run_with(executor, 4, &targets).await;

        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: Vec<_> = targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_empty_target_list() {
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(1)));
        let results = run_with(executor, 2, &[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_probe_does_not_block_siblings() {
        let mut targets = create_targets(3);
        targets.insert(
            1,
            ProbeTarget::new("http", "example.com", "/boom", None).unwrap(),
        );

        // 并发为1时，若许可未归还，后续任务将永远无法派发
        let results = run_with(Arc::new(PanickingExecutor), 1, &targets).await;

        assert_eq!(results.len(), 4);
        assert!(results[1].error_message().is_some());
        assert_eq!(results[0].status_code(), Some(200));
        assert_eq!(results[3].status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_is_not_an_interrupt() {
        let targets = create_targets(4);
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(1)));
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        drop(shutdown_tx);

        let results = ProbeScheduler::new(executor, 1)
            .run(&targets, shutdown_rx)
            .await
            .unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_shutdown_stops_dispatch_and_waits_for_in_flight() {
        let targets = create_targets(10);
        let executor = Arc::new(CountingExecutor::new(Duration::from_millis(50)));
        let scheduler = ProbeScheduler::new(executor.clone(), 2);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(70)).await;
            let _ = shutdown_tx.send(());
        });

        let result = scheduler.run(&targets, shutdown_rx).await;
        sender.await.unwrap();

        match result {
            Err(CheckerError::Interrupted { completed, total }) => {
                assert_eq!(total, 10);
                assert!(completed < 10);
                // 已派发的探测全部完成
                assert_eq!(completed, executor.calls.load(Ordering::SeqCst));
                assert_eq!(executor.in_flight.load(Ordering::SeqCst), 0);
            }
            other => panic!("expected interruption, got {other:?}"),
        }
    }
}
