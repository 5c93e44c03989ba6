use std::fmt;

/// 会话统计数据
///
/// 只增不减，随会话对象存在；新的 start 不清零 (便于观察多次重启)。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionTelemetry {
    /// 进入去重门的原始检测数
    pub raw_events: u64,

    /// 通过去重门、写入 ScanLog 的数量
    pub accepted: u64,

    /// 被去重窗口抑制的重复数
    pub suppressed: u64,

    /// stop 时仍在队列中、被丢弃而未处理的检测数
    pub discarded_after_stop: u64,

    /// 声音反馈失败次数 (不会中断扫描)
    pub feedback_failures: u64,

    /// 初始化失败 + 运行期故障
    pub faults: u64,

    /// 成功进入 Running 的次数
    pub starts: u64,
}

impl fmt::Debug for SessionTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTelemetry")
            .field("raw", &self.raw_events)
            .field("accepted", &self.accepted)
            .field("suppressed", &self.suppressed)
            .field("discarded", &self.discarded_after_stop)
            .field("faults", &self.faults)
            .finish()
    }
}

impl SessionTelemetry {
    /// 被抑制的比例，用于判断条码在画面中停留的时长
    pub fn suppression_ratio(&self) -> f64 {
        if self.raw_events == 0 {
            0.0
        } else {
            self.suppressed as f64 / self.raw_events as f64
        }
    }
}
