use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 时间源
///
/// DecodeEvent 的时间戳由它给出。去重窗口的正确性只依赖单调性，
/// 所以默认实现就是 `Instant::now()`；测试与仿真使用 `ManualClock`。
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// 系统单调时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的时钟 (测试/仿真)
///
/// Clone 出来的副本共享同一个当前时刻。
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// 向前推进
    pub fn advance(&self, by: Duration) {
        let mut now = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
