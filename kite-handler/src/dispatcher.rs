//! 有界投递调度器（DeliveryDispatcher）
//!
//! 固定容量的投递槽位池：
//! - 非阻塞地获取一个槽位，成功则把投递任务交给运行时异步执行；
//! - 任务结束（正常返回、panic 或被运行时丢弃）时无条件归还槽位；
//! - 槽位耗尽时在调用方上下文中同步执行任务，作为背压手段。
//!
//! 任务不会被丢弃，也不会执行多于一次；池的占用数永不超过容量。
//!
use kite_domain::error::{KiteError, KiteResult};
use kite_domain::stat::{FlowCounter, FlowRecorder};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::task::TaskTracker;

/// 任务的执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// 占用槽位，在独立任务中执行
    Pooled,
    /// 槽位耗尽，在调用方上下文中执行完毕
    Inline,
}

pub struct DeliveryDispatcher {
    slots: Arc<Semaphore>,
    capacity: usize,
    flow: Arc<dyn FlowRecorder>,
    tracker: TaskTracker,
}

impl DeliveryDispatcher {
    /// 最大可配置容量
    pub const MAX_CAPACITY: usize = Semaphore::MAX_PERMITS;

    /// 容量超过 `MAX_CAPACITY` 时返回 `KiteError::InvalidConfig`
    pub fn new(capacity: NonZeroUsize, flow: Arc<dyn FlowRecorder>) -> KiteResult<Self> {
        let capacity = capacity.get();
        if capacity > Self::MAX_CAPACITY {
            return Err(KiteError::invalid_config(format!(
                "delivery pool capacity {capacity} exceeds {}",
                Self::MAX_CAPACITY
            )));
        }
        Ok(Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            flow,
            tracker: TaskTracker::new(),
        })
    }

    /// 调度一次投递任务；本身不会失败，任务内部的错误由任务自行处理
    pub async fn dispatch<F>(&self, task: F) -> DispatchMode
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.slots.clone().try_acquire_owned() {
            Ok(permit) => {
                self.flow.incr(FlowCounter::DeliverPool, 1);
                let slot = SlotGuard {
                    _permit: permit,
                    flow: self.flow.clone(),
                };
                tracing::trace!(in_flight = self.in_flight(), "delivery slot acquired");
                self.tracker.spawn(async move {
                    let _slot = slot;
                    task.await;
                });
                DispatchMode::Pooled
            }
            Err(_) => {
                tracing::trace!(
                    capacity = self.capacity,
                    "delivery pool exhausted, running on caller"
                );
                task.await;
                DispatchMode::Inline
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前空闲槽位数
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// 当前异步执行中的投递数
    pub fn in_flight(&self) -> usize {
        self.capacity - self.available()
    }

    /// 等待当前已派发的异步投递全部结束
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

/// 槽位守卫：在异步分支的任意退出路径上归还槽位
struct SlotGuard {
    _permit: OwnedSemaphorePermit,
    flow: Arc<dyn FlowRecorder>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.flow.incr(FlowCounter::DeliverPool, -1);
        tracing::trace!("delivery slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_domain::stat::FlowStat;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn dispatcher(capacity: usize) -> (DeliveryDispatcher, Arc<FlowStat>) {
        let stat = Arc::new(FlowStat::new());
        let d = DeliveryDispatcher::new(NonZeroUsize::new(capacity).unwrap(), stat.clone())
            .expect("capacity within bounds");
        (d, stat)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pooled_when_slot_free_inline_when_exhausted() {
        let (d, stat) = dispatcher(1);
        let gate = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());

        let mode = {
            let gate = gate.clone();
            let started = started.clone();
            d.dispatch(async move {
                started.notify_one();
                gate.notified().await;
            })
            .await
        };
        assert_eq!(mode, DispatchMode::Pooled);
        tokio::time::timeout(Duration::from_secs(2), started.notified())
            .await
            .unwrap();
        assert_eq!(d.in_flight(), 1);
        assert_eq!(stat.get(FlowCounter::DeliverPool), 1);

        let ran = Arc::new(AtomicUsize::new(0));
        let mode = {
            let ran = ran.clone();
            d.dispatch(async move {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .await
        };
        assert_eq!(mode, DispatchMode::Inline);
        // 同步执行：返回前已完成
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        gate.notify_one();
        tokio::time::timeout(Duration::from_secs(2), d.wait_idle())
            .await
            .unwrap();
        assert_eq!(d.in_flight(), 0);
        assert_eq!(d.available(), 1);
        assert_eq!(stat.get(FlowCounter::DeliverPool), 0);
    }

    tokio::task_local! {
        // 仅在调用方任务内可见；派发到池中的任务看不到它
        static ON_CALLER: ();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_task_runs_exactly_once_under_contention() {
        let (d, stat) = dispatcher(3);
        let d = Arc::new(d);
        let runs = Arc::new(AtomicUsize::new(0));
        let pooled_running = Arc::new(AtomicUsize::new(0));
        let pooled_peak = Arc::new(AtomicUsize::new(0));
        let pooled_seen = Arc::new(AtomicUsize::new(0));

        let mut callers = Vec::new();
        for _ in 0..64 {
            let d = d.clone();
            let runs = runs.clone();
            let pooled_running = pooled_running.clone();
            let pooled_peak = pooled_peak.clone();
            let pooled_seen = pooled_seen.clone();
            callers.push(tokio::spawn(ON_CALLER.scope((), async move {
                d.dispatch(async move {
                    let pooled = ON_CALLER.try_with(|_| ()).is_err();
                    if pooled {
                        let now = pooled_running.fetch_add(1, Ordering::SeqCst) + 1;
                        pooled_peak.fetch_max(now, Ordering::SeqCst);
                        pooled_seen.fetch_add(1, Ordering::SeqCst);
                    }
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    if pooled {
                        pooled_running.fetch_sub(1, Ordering::SeqCst);
                    }
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .await
            })));
        }

        let mut pooled = 0;
        let mut inline = 0;
        for c in callers {
            match c.await.unwrap() {
                DispatchMode::Pooled => pooled += 1,
                DispatchMode::Inline => inline += 1,
            }
        }
        tokio::time::timeout(Duration::from_secs(5), d.wait_idle())
            .await
            .unwrap();

        assert_eq!(pooled + inline, 64);
        assert!(pooled >= 1);
        assert_eq!(runs.load(Ordering::SeqCst), 64);
        // 任务内部识别出的池化执行次数与返回的执行方式一致
        assert_eq!(pooled_seen.load(Ordering::SeqCst), pooled);
        assert!(pooled_peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(pooled_running.load(Ordering::SeqCst), 0);
        assert_eq!(d.available(), 3);
        assert_eq!(stat.get(FlowCounter::DeliverPool), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_task_releases_slot() {
        let (d, stat) = dispatcher(1);
        let mode = d
            .dispatch(async {
                panic!("delivery blew up")
            })
            .await;
        assert_eq!(mode, DispatchMode::Pooled);

        tokio::time::timeout(Duration::from_secs(2), d.wait_idle())
            .await
            .unwrap();
        assert_eq!(d.available(), 1);
        assert_eq!(stat.get(FlowCounter::DeliverPool), 0);

        // 槽位归还后可再次异步调度
        let mode = d.dispatch(async {}).await;
        assert_eq!(mode, DispatchMode::Pooled);
        d.wait_idle().await;
    }

    #[test]
    fn reports_capacity() {
        let (d, _) = dispatcher(2);
        assert_eq!(d.capacity(), 2);
        assert_eq!(d.in_flight(), 0);
    }

    #[test]
    fn rejects_capacity_above_max() {
        let capacity = NonZeroUsize::new(DeliveryDispatcher::MAX_CAPACITY + 1).unwrap();
        let result = DeliveryDispatcher::new(capacity, Arc::new(FlowStat::new()));
        assert!(matches!(result, Err(KiteError::InvalidConfig { .. })));

        let capacity = NonZeroUsize::new(DeliveryDispatcher::MAX_CAPACITY).unwrap();
        assert!(DeliveryDispatcher::new(capacity, Arc::new(FlowStat::new())).is_ok());
    }
}
