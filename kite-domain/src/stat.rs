//! 流量统计（stat）
//!
//! 各阶段只负责按名称增减计数器，聚合与导出由外部负责。
//!
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// 计数器名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowCounter {
    /// 已发起的投递次数
    DeliverFlow,
    /// 当前占用的投递槽位数
    DeliverPool,
}

/// 计数器记录协议，实现方需自行保证并发安全
pub trait FlowRecorder: Send + Sync {
    fn incr(&self, counter: FlowCounter, delta: i64);
}

impl<T> FlowRecorder for Arc<T>
where
    T: FlowRecorder + ?Sized,
{
    fn incr(&self, counter: FlowCounter, delta: i64) {
        (**self).incr(counter, delta)
    }
}

/// 基于原子整数的计数器实现
#[derive(Debug, Default)]
pub struct FlowStat {
    deliver_flow: AtomicI64,
    deliver_pool: AtomicI64,
}

/// 某一时刻的计数快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlowSnapshot {
    pub deliver_flow: i64,
    pub deliver_pool: i64,
}

impl FlowStat {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: FlowCounter) -> &AtomicI64 {
        match counter {
            FlowCounter::DeliverFlow => &self.deliver_flow,
            FlowCounter::DeliverPool => &self.deliver_pool,
        }
    }

    pub fn get(&self, counter: FlowCounter) -> i64 {
        self.counter(counter).load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            deliver_flow: self.get(FlowCounter::DeliverFlow),
            deliver_pool: self.get(FlowCounter::DeliverPool),
        }
    }
}

impl FlowRecorder for FlowStat {
    fn incr(&self, counter: FlowCounter, delta: i64) {
        self.counter(counter).fetch_add(delta, Ordering::AcqRel);
    }
}
