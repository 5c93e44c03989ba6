use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use async_trait::async_trait;
use livescan_core::constraints::{RenderTarget, StreamConfig};
use livescan_core::error::{Result, ScanError};
use livescan_core::event::DetectionSink;
use livescan_core::traits::LiveDecoder;

#[derive(Debug, Default)]
struct Shared {
    // 故意在 stop 之后仍然保留，用来模拟迟到的平台回调
    sink: Option<DetectionSink>,
    init_calls: usize,
    start_calls: usize,
    stop_calls: usize,
    last_target: Option<RenderTarget>,
    last_config: Option<StreamConfig>,
    capturing: bool,
}

/// 脚本化的实时解码器
///
/// 检测结果不来自图像，而是由测试通过 `DecoderHandle` 手动推送。
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    shared: Arc<Mutex<Shared>>,
    init_failure: Option<String>,
    start_failure: Option<String>,
    stop_failure: Option<String>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// init 时以给定原因失败 (例如设备被占用)
    pub fn fail_init(mut self, cause: impl Into<String>) -> Self {
        self.init_failure = Some(cause.into());
        self
    }

    pub fn fail_start(mut self, cause: impl Into<String>) -> Self {
        self.start_failure = Some(cause.into());
        self
    }

    /// 释放设备时报错 (会话应当忽略)
    pub fn fail_stop(mut self, cause: impl Into<String>) -> Self {
        self.stop_failure = Some(cause.into());
        self
    }

    /// 获取控制句柄，解码器被移交给会话后仍可使用
    pub fn handle(&self) -> DecoderHandle {
        DecoderHandle {
            shared: self.shared.clone(),
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl LiveDecoder for ScriptedDecoder {
    async fn init(
        &mut self,
        target: &RenderTarget,
        config: &StreamConfig,
        sink: DetectionSink,
    ) -> Result<()> {
        let mut shared = lock(&self.shared);
        shared.init_calls += 1;
        shared.last_target = Some(target.clone());
        shared.last_config = Some(config.clone());

        if let Some(cause) = &self.init_failure {
            return Err(ScanError::Platform(cause.clone()));
        }

        shared.sink = Some(sink);
        shared.capturing = true;
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        shared.start_calls += 1;
        match &self.start_failure {
            Some(cause) => Err(ScanError::Platform(cause.clone())),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        shared.stop_calls += 1;
        shared.capturing = false;
        match &self.stop_failure {
            Some(cause) => Err(ScanError::Platform(cause.clone())),
            None => Ok(()),
        }
    }
}

/// 测试侧的控制句柄：扮演平台回调
#[derive(Debug, Clone)]
pub struct DecoderHandle {
    shared: Arc<Mutex<Shared>>,
}

impl DecoderHandle {
    /// 推送一个检测结果，时间戳取会话时钟；返回是否被会话接收
    pub fn emit(&self, code: &str) -> bool {
        match &lock(&self.shared).sink {
            Some(sink) => sink.detected(code),
            None => false,
        }
    }

    /// 推送一个带时间戳的检测结果
    pub fn emit_at(&self, code: &str, at: Instant) -> bool {
        match &lock(&self.shared).sink {
            Some(sink) => sink.detected_at(code, at),
            None => false,
        }
    }

    /// 模拟采集流中断
    pub fn fault(&self, cause: &str) -> bool {
        match &lock(&self.shared).sink {
            Some(sink) => sink.fault(cause),
            None => false,
        }
    }

    /// 丢掉推送端 (解码器内部崩溃的另一种表现)
    pub fn drop_sink(&self) {
        lock(&self.shared).sink = None;
    }

    pub fn init_calls(&self) -> usize {
        lock(&self.shared).init_calls
    }

    pub fn start_calls(&self) -> usize {
        lock(&self.shared).start_calls
    }

    pub fn stop_calls(&self) -> usize {
        lock(&self.shared).stop_calls
    }

    pub fn last_target(&self) -> Option<RenderTarget> {
        lock(&self.shared).last_target.clone()
    }

    pub fn last_config(&self) -> Option<StreamConfig> {
        lock(&self.shared).last_config.clone()
    }

    pub fn is_capturing(&self) -> bool {
        lock(&self.shared).capturing
    }
}
