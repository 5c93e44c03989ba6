use std::fmt;
use std::sync::Arc;

use livescan_core::constraints::{RenderTarget, StreamConfig};
use livescan_core::error::{Result, ScanError};
use livescan_core::event::{DecodeEvent, DecoderSignal, DetectionSink};
use livescan_core::time::{Clock, SystemClock};
use livescan_core::traits::LiveDecoder;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// 解码器会话状态
///
/// ```text
/// Idle -> Initializing -> Running -> Stopped
///              \              \
///               +-> Errored <--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    Initializing,
    Running,
    Stopped,
    Errored,
}

/// 实时解码器的生命周期管理
///
/// 同一时间最多一个活动的解码器实例 (物理摄像头是独占资源)。
/// 每次 `start` 都会新建一条事件通道，旧通道上的迟到回调不会串到新会话里。
pub struct DecoderSession {
    decoder: Box<dyn LiveDecoder>,
    clock: Arc<dyn Clock>,
    state: DecoderState,
    events: Option<UnboundedReceiver<DecoderSignal>>,
    last_error: Option<ScanError>,
    // 是否持有设备/渲染目标，保证 release 只执行一次
    holding_device: bool,
    releases: u64,
}

impl fmt::Debug for DecoderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderSession")
            .field("state", &self.state)
            .field("holding_device", &self.holding_device)
            .field("releases", &self.releases)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl DecoderSession {
    pub fn new(decoder: Box<dyn LiveDecoder>) -> Self {
        Self::with_clock(decoder, Arc::new(SystemClock))
    }

    pub fn with_clock(decoder: Box<dyn LiveDecoder>, clock: Arc<dyn Clock>) -> Self {
        Self {
            decoder,
            clock,
            state: DecoderState::Idle,
            events: None,
            last_error: None,
            holding_device: false,
            releases: 0,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DecoderState::Running
    }

    pub fn last_error(&self) -> Option<&ScanError> {
        self.last_error.as_ref()
    }

    /// 实际执行过的设备释放次数
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Idle/Stopped/Errored -> Initializing -> Running
    ///
    /// 如果上一个会话仍在运行，先停止它。失败时进入 Errored、释放设备，并原样返回平台原因，不自动重试。
    pub async fn start(&mut self, target: &RenderTarget, config: &StreamConfig) -> Result<()> {
        if matches!(self.state, DecoderState::Initializing | DecoderState::Running) {
            tracing::info!("Stopping previous decoder session before restart");
            self.stop().await;
        }

        self.last_error = None;
        self.state = DecoderState::Initializing;
        self.holding_device = true;

        // 新的事件序列
        let (sink, rx) = DetectionSink::channel(self.clock.clone());
        self.events = Some(rx);

        tracing::info!(
            "Initializing decoder on {} with {:?}",
            target.as_str(),
            config.constraints
        );

        if let Err(e) = self.decoder.init(target, config, sink).await {
            return Err(self.fail(e.into_init_failure()).await);
        }

        // 初始化成功后才启动处理循环
        if let Err(e) = self.decoder.start().await {
            return Err(self.fail(e.into_init_failure()).await);
        }

        self.state = DecoderState::Running;
        tracing::info!("Decoder running");
        Ok(())
    }

    /// 停止会话，返回被丢弃的未处理检测数
    ///
    /// 幂等：重复调用不会报错，也不会重复释放设备。
    /// 先同步断开事件通道，再释放设备，之后的任何回调都到不了去重门。
    pub async fn stop(&mut self) -> usize {
        let discarded = self.detach();

        if matches!(self.state, DecoderState::Initializing | DecoderState::Running) {
            self.state = DecoderState::Stopped;
            tracing::info!("Decoder stopped ({} pending detections discarded)", discarded);
        }

        self.release().await;
        discarded
    }

    /// 等待下一个检测结果
    ///
    /// * `Ok(Some(event))` - 新的检测
    /// * `Ok(None)` - 会话没有在运行
    /// * `Err(e)` - 运行期故障，会话已进入 Errored 并释放设备
    pub async fn next_event(&mut self) -> Result<Option<DecodeEvent>> {
        if self.state != DecoderState::Running {
            return Ok(None);
        }
        let Some(rx) = self.events.as_mut() else {
            return Ok(None);
        };

        let signal = rx.recv().await;
        self.on_signal(signal).await
    }

    /// 取出一个已到达的检测结果，不等待新的检测
    ///
    /// 故障处理与 `next_event` 相同：进入 Errored 并立即释放设备。
    pub async fn try_next_event(&mut self) -> Result<Option<DecodeEvent>> {
        if self.state != DecoderState::Running {
            return Ok(None);
        }
        let Some(rx) = self.events.as_mut() else {
            return Ok(None);
        };

        match rx.try_recv() {
            Ok(signal) => self.on_signal(Some(signal)).await,
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => self.on_signal(None).await,
        }
    }

    async fn on_signal(&mut self, signal: Option<DecoderSignal>) -> Result<Option<DecodeEvent>> {
        let err = match signal {
            Some(DecoderSignal::Detected(event)) => return Ok(Some(event)),
            Some(DecoderSignal::Fault(cause)) => ScanError::RuntimeDecoderFault(cause),
            // 解码器丢掉了所有推送端，之后不可能再有事件
            None => ScanError::RuntimeDecoderFault("decoder event stream closed".into()),
        };
        Err(self.fail(err).await)
    }

    // 任何失败都会断开事件通道并释放设备，调用方重试时摄像头是空闲的
    async fn fail(&mut self, err: ScanError) -> ScanError {
        self.detach();
        self.state = DecoderState::Errored;
        self.last_error = Some(err.clone());
        tracing::error!("Decoder session failed: {}", err);
        self.release().await;
        err
    }

    // 关闭并丢弃接收端，返回队列中未处理的检测数
    fn detach(&mut self) -> usize {
        let Some(mut rx) = self.events.take() else {
            return 0;
        };
        rx.close();

        let mut discarded = 0;
        while let Ok(signal) = rx.try_recv() {
            if matches!(signal, DecoderSignal::Detected(_)) {
                discarded += 1;
            }
        }
        discarded
    }

    async fn release(&mut self) {
        if !self.holding_device {
            return;
        }
        self.holding_device = false;
        self.releases += 1;

        if let Err(e) = self.decoder.stop().await {
            // 释放失败不影响会话状态
            tracing::warn!("Failed to release capture device: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::build_constraints;
    use livescan_core::time::ManualClock;
    use livescan_simulation::ScriptedDecoder;

    fn target() -> RenderTarget {
        RenderTarget::new("#scanner-container")
    }

    #[tokio::test]
    async fn walks_idle_initializing_running_stopped() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));
        assert_eq!(session.state(), DecoderState::Idle);

        session.start(&target(), &build_constraints(None)).await.unwrap();
        assert_eq!(session.state(), DecoderState::Running);
        assert_eq!(handle.init_calls(), 1);
        assert_eq!(handle.start_calls(), 1);
        assert_eq!(handle.last_target(), Some(target()));

        session.stop().await;
        assert_eq!(session.state(), DecoderState::Stopped);
        assert_eq!(handle.stop_calls(), 1);
    }

    #[tokio::test]
    async fn init_failure_is_reported_verbatim() {
        let decoder =
            ScriptedDecoder::new().fail_init("NotReadableError: Could not start video source");
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));

        let err = session
            .start(&target(), &build_constraints(None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::InitializationFailed(
                "NotReadableError: Could not start video source".into()
            )
        );
        assert_eq!(session.state(), DecoderState::Errored);
        assert_eq!(session.last_error(), Some(&err));
        // 没有自动重试，设备已释放
        assert_eq!(handle.init_calls(), 1);
        assert_eq!(handle.start_calls(), 0);
        assert_eq!(handle.stop_calls(), 1);
    }

    #[tokio::test]
    async fn start_failure_after_init_releases_the_camera_once() {
        let decoder = ScriptedDecoder::new().fail_start("decoder worker crashed");
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));

        let err = session
            .start(&target(), &build_constraints(None))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ScanError::InitializationFailed("decoder worker crashed".into())
        );
        assert_eq!(session.state(), DecoderState::Errored);
        assert!(!handle.is_capturing());
        assert_eq!(handle.stop_calls(), 1);

        // 后续 stop 不再释放
        session.stop().await;
        assert_eq!(session.releases(), 1);
        assert_eq!(handle.stop_calls(), 1);
    }

    #[tokio::test]
    async fn retry_after_start_failure_reopens_a_free_camera() {
        let decoder = ScriptedDecoder::new().fail_start("decoder worker crashed");
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));

        for attempt in 1..=2 {
            assert!(session
                .start(&target(), &build_constraints(None))
                .await
                .is_err());
            assert_eq!(handle.init_calls(), attempt);
            assert_eq!(handle.stop_calls(), attempt);
            assert!(!handle.is_capturing());
        }
    }

    #[tokio::test]
    async fn failed_release_still_stops_the_session() {
        let decoder = ScriptedDecoder::new().fail_stop("device already gone");
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));
        session.start(&target(), &build_constraints(None)).await.unwrap();

        session.stop().await;
        assert_eq!(session.state(), DecoderState::Stopped);
        assert_eq!(session.last_error(), None);
        assert_eq!(session.releases(), 1);

        session.stop().await;
        assert_eq!(handle.stop_calls(), 1);
    }

    #[tokio::test]
    async fn stop_twice_releases_once() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));
        session.start(&target(), &build_constraints(None)).await.unwrap();

        session.stop().await;
        session.stop().await;

        assert_eq!(session.state(), DecoderState::Stopped);
        assert_eq!(session.releases(), 1);
        assert_eq!(handle.stop_calls(), 1);
    }

    #[tokio::test]
    async fn stop_before_start_is_a_no_op() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));

        assert_eq!(session.stop().await, 0);
        assert_eq!(session.state(), DecoderState::Idle);
        assert_eq!(handle.stop_calls(), 0);
    }

    #[tokio::test]
    async fn events_after_stop_never_surface() {
        let clock = ManualClock::new();
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::with_clock(Box::new(decoder), Arc::new(clock));
        session.start(&target(), &build_constraints(None)).await.unwrap();

        assert!(handle.emit("111"));
        assert!(handle.emit("222"));
        // 队列里的两个检测在 stop 时被丢弃，而不是被排空处理
        assert_eq!(session.stop().await, 2);

        // 迟到的回调
        assert!(!handle.emit("333"));
        assert_eq!(session.try_next_event().await.unwrap(), None);
        assert_eq!(session.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn runtime_fault_moves_to_errored_and_releases() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));
        session.start(&target(), &build_constraints(None)).await.unwrap();

        assert!(handle.emit("4006381333931"));
        assert!(handle.fault("Track ended"));

        let first = session.next_event().await.unwrap().unwrap();
        assert_eq!(first.code, "4006381333931");

        let err = session.next_event().await.unwrap_err();
        assert_eq!(err, ScanError::RuntimeDecoderFault("Track ended".into()));
        assert_eq!(session.state(), DecoderState::Errored);
        assert_eq!(handle.stop_calls(), 1);
        assert!(!handle.is_capturing());

        // 之后 stop 不会重复释放
        session.stop().await;
        assert_eq!(handle.stop_calls(), 1);
        assert_eq!(session.state(), DecoderState::Errored);
    }

    #[tokio::test]
    async fn restart_stops_the_running_instance_first() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));

        session.start(&target(), &build_constraints(None)).await.unwrap();
        let old_sink_emit = handle.emit("stale");
        assert!(old_sink_emit);

        session.start(&target(), &build_constraints(None)).await.unwrap();
        assert_eq!(handle.stop_calls(), 1);
        assert_eq!(handle.init_calls(), 2);
        assert_eq!(session.releases(), 1);

        // 新会话是独立的事件序列，旧事件已丢弃
        assert_eq!(session.try_next_event().await.unwrap(), None);
        assert!(handle.emit("fresh"));
        assert_eq!(
            session.try_next_event().await.unwrap().unwrap().code,
            "fresh"
        );
    }

    #[tokio::test]
    async fn dropped_sink_is_treated_as_a_fault() {
        let decoder = ScriptedDecoder::new();
        let handle = decoder.handle();
        let mut session = DecoderSession::new(Box::new(decoder));
        session.start(&target(), &build_constraints(None)).await.unwrap();

        handle.drop_sink();
        let err = session.try_next_event().await.unwrap_err();
        assert!(matches!(err, ScanError::RuntimeDecoderFault(_)));
        assert_eq!(session.state(), DecoderState::Errored);
        assert_eq!(handle.stop_calls(), 1);
        assert!(!handle.is_capturing());

        session.stop().await;
        assert_eq!(handle.stop_calls(), 1);
    }
}
