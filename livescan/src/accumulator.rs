use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use livescan_core::traits::Feedback;
use tokio::sync::watch;

/// 扫描结果累加器
///
/// 只追加、从不删除；不做任何去重 (完全信任去重门的判定)。
/// 每个被接受的码触发一次声音反馈，反馈失败只记录日志，不会中断扫描。
pub struct ScanAccumulator {
    log: Vec<String>,
    feedback: Arc<dyn Feedback>,
    // UI 层通过 watch 订阅最新快照
    publisher: watch::Sender<Vec<String>>,
    feedback_failures: u64,
}

impl fmt::Debug for ScanAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanAccumulator")
            .field("len", &self.log.len())
            .field("feedback_failures", &self.feedback_failures)
            .finish()
    }
}

impl ScanAccumulator {
    pub fn new(feedback: Arc<dyn Feedback>) -> Self {
        let (publisher, _) = watch::channel(Vec::new());
        Self {
            log: Vec::new(),
            feedback,
            publisher,
            feedback_failures: 0,
        }
    }

    /// 追加一个已接受的码，返回反馈是否成功
    pub fn on_accepted(&mut self, code: &str) -> bool {
        self.log.push(code.to_owned());
        // 没有订阅者时 send 会失败，send_replace 总能更新
        self.publisher.send_replace(self.log.clone());

        let beeped = match catch_unwind(AssertUnwindSafe(|| self.feedback.beep())) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("Feedback failed for {}: {}", code, e);
                false
            }
            Err(_) => {
                tracing::warn!("Feedback panicked for {}", code);
                false
            }
        };
        if !beeped {
            self.feedback_failures += 1;
        }
        beeped
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn feedback_failures(&self) -> u64 {
        self.feedback_failures
    }

    /// 订阅 ScanLog 的更新
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.publisher.subscribe()
    }
}
