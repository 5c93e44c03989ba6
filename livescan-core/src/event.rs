use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::time::Clock;

/// 一次成功定位 + 解码的原始输出
///
/// 条码留在画面中时每秒可能产生很多个。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeEvent {
    pub code: String,
    pub timestamp: Instant,
}

impl DecodeEvent {
    pub fn new(code: impl Into<String>, timestamp: Instant) -> Self {
        Self {
            code: code.into(),
            timestamp,
        }
    }
}

/// 解码器推送给会话的信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderSignal {
    Detected(DecodeEvent),
    /// 运行期不可恢复故障 (采集流中断、解码器崩溃)
    Fault(String),
}

/// 解码器回调的推送端
///
/// 平台回调可能来自任意内部线程，这里只负责把信号按发出顺序塞进单消费者通道，
/// 真正的状态修改由会话在自己的上下文里完成。
/// 会话停止时接收端被关闭，之后的推送全部被丢弃 (返回 false)。
#[derive(Debug, Clone)]
pub struct DetectionSink {
    tx: UnboundedSender<DecoderSignal>,
    clock: Arc<dyn Clock>,
}

impl DetectionSink {
    /// 创建一对推送端/接收端
    pub fn channel(clock: Arc<dyn Clock>) -> (Self, UnboundedReceiver<DecoderSignal>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx, clock }, rx)
    }

    /// 推送一个检测结果，时间戳取自会话时钟
    pub fn detected(&self, code: impl Into<String>) -> bool {
        let at = self.clock.now();
        self.detected_at(code, at)
    }

    /// 推送一个带平台时间戳的检测结果
    ///
    /// 空字符串不是有效结果，直接忽略。
    pub fn detected_at(&self, code: impl Into<String>, at: Instant) -> bool {
        let code = code.into();
        if code.is_empty() {
            tracing::trace!("Ignoring empty decode result");
            return false;
        }
        self.send(DecoderSignal::Detected(DecodeEvent::new(code, at)))
    }

    /// 报告运行期故障
    pub fn fault(&self, cause: impl Into<String>) -> bool {
        self.send(DecoderSignal::Fault(cause.into()))
    }

    /// 会话是否已经停止接收
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, signal: DecoderSignal) -> bool {
        match self.tx.send(signal) {
            Ok(()) => true,
            Err(_) => {
                // 会话已停止：迟到的回调直接丢弃
                tracing::debug!("Decoder callback after session stop, discarded");
                false
            }
        }
    }
}
