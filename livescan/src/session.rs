use std::fmt;
use std::sync::Arc;

use livescan_core::builder::ScanConfig;
use livescan_core::constraints::{RenderTarget, StreamConfig};
use livescan_core::device::CaptureDevice;
use livescan_core::error::{Result, ScanError};
use livescan_core::event::DecodeEvent;
use livescan_core::telemetry::SessionTelemetry;
use livescan_core::time::{Clock, SystemClock};
use livescan_core::traits::{Feedback, LiveDecoder, MediaDevices, Silent};
use tokio::sync::watch;

use crate::accumulator::ScanAccumulator;
use crate::configurator::configure;
use crate::decoder_session::{DecoderSession, DecoderState};
use crate::dedup::DedupGate;
use crate::selector::{CameraSelector, LabelRanker};

/// 给 UI 观察的会话状态
///
/// `started` 为 None 表示还没有尝试过启动。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub started: Option<bool>,
    pub error: Option<String>,
}

/// 一次连续扫描会话
///
/// 设备清单 → 摄像头选择 → 流配置 → 解码器启动 → (原始检测) → 去重门 → 结果累加。
/// 显式构造的对象，没有任何全局状态，多个会话 (多个扫描控件) 可以互不干扰地共存。
///
/// 所有状态修改都发生在持有 `&mut self` 的同一个上下文里；
/// 平台回调只能通过 `DetectionSink` 排队，不会重入。
pub struct ScanSession {
    devices: Arc<dyn MediaDevices>,
    decoder: DecoderSession,
    selector: CameraSelector,
    config: ScanConfig,
    gate: DedupGate,
    accumulator: ScanAccumulator,
    telemetry: SessionTelemetry,
    status: watch::Sender<SessionStatus>,
    selected: Option<CaptureDevice>,
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("decoder", &self.decoder)
            .field("selected", &self.selected)
            .field("scanned", &self.accumulator.len())
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

/// ScanSession 构建器
pub struct ScanSessionBuilder {
    devices: Arc<dyn MediaDevices>,
    decoder: Box<dyn LiveDecoder>,
    feedback: Arc<dyn Feedback>,
    config: ScanConfig,
    clock: Arc<dyn Clock>,
    ranker: Option<Arc<dyn LabelRanker>>,
}

impl fmt::Debug for ScanSessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSessionBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScanSessionBuilder {
    /// 声音反馈，默认静音
    pub fn feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// 时间源，默认系统单调时钟
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 替换 label 排名函数 (默认使用配置中的词表)
    pub fn ranker(mut self, ranker: impl LabelRanker + 'static) -> Self {
        self.ranker = Some(Arc::new(ranker));
        self
    }

    pub fn build(self) -> Result<ScanSession> {
        self.config.validate()?;

        let selector = match self.ranker {
            Some(ranker) => CameraSelector::from_shared(ranker),
            None => CameraSelector::new(self.config.vocabulary.clone()),
        };
        let (status, _) = watch::channel(SessionStatus::default());

        Ok(ScanSession {
            devices: self.devices,
            decoder: DecoderSession::with_clock(self.decoder, self.clock),
            selector,
            gate: DedupGate::new(self.config.debounce_window),
            config: self.config,
            accumulator: ScanAccumulator::new(self.feedback),
            telemetry: SessionTelemetry::default(),
            status,
            selected: None,
        })
    }
}

impl ScanSession {
    pub fn builder(
        devices: Arc<dyn MediaDevices>,
        decoder: Box<dyn LiveDecoder>,
    ) -> ScanSessionBuilder {
        ScanSessionBuilder {
            devices,
            decoder,
            feedback: Arc::new(Silent),
            config: ScanConfig::default(),
            clock: Arc::new(SystemClock),
            ranker: None,
        }
    }

    /// 完整的启动流程：能力检查 → 枚举 → 选择 → 配置 → 启动
    ///
    /// 任一步失败都会更新可观察的错误字段与 started 标记，并原样返回错误；不自动重试。
    pub async fn initialize(&mut self, target: &RenderTarget) -> Result<()> {
        if !self.devices.supports_enumeration() {
            let err = ScanError::MediaAccessUnsupported {
                platform: self.devices.platform().to_string(),
            };
            return Err(self.record_failure(err));
        }

        let devices = match self.devices.list_devices().await {
            Ok(devices) => devices,
            Err(e @ ScanError::MediaAccessUnsupported { .. }) => {
                return Err(self.record_failure(e))
            }
            Err(e) => return Err(self.record_failure(ScanError::EnumerationFailed(e.cause()))),
        };

        // 启发式选择一个合适的初始摄像头
        self.selected = self.selector.select(&devices).cloned();
        match &self.selected {
            Some(camera) => {
                tracing::info!("Using {} ({}) as initial camera", camera.label, camera.id)
            }
            None => tracing::warn!(
                "Unable to determine suitable camera, will fall back to default handling"
            ),
        }

        let stream = configure(self.selected.as_ref(), &self.config);
        self.start(target, &stream).await
    }

    /// 用给定的流配置启动解码器
    ///
    /// 正在运行的会话会先被停止；每次启动都有全新的去重状态。
    pub async fn start(&mut self, target: &RenderTarget, stream: &StreamConfig) -> Result<()> {
        if matches!(
            self.decoder.state(),
            DecoderState::Initializing | DecoderState::Running
        ) {
            self.stop().await;
        }

        self.gate.reset();

        match self.decoder.start(target, stream).await {
            Ok(()) => {
                self.telemetry.starts += 1;
                self.publish(Some(true), None);
                Ok(())
            }
            Err(e) => Err(self.record_failure(e)),
        }
    }

    /// 停止扫描，幂等
    ///
    /// 返回后不会再有任何检测到达去重门，ScanLog 保持不变。
    pub async fn stop(&mut self) {
        let was_active = matches!(
            self.decoder.state(),
            DecoderState::Initializing | DecoderState::Running
        );

        let discarded = self.decoder.stop().await;
        self.telemetry.discarded_after_stop += discarded as u64;

        if was_active {
            let error = self.status.borrow().error.clone();
            self.publish(Some(false), error);
        }
    }

    /// 处理所有已经到达的检测，返回本次新接受的数量
    ///
    /// 不等待新的检测。遇到运行期故障时会话进入 Errored，设备随即被释放。
    pub async fn process_pending(&mut self) -> usize {
        let mut accepted = 0;
        loop {
            match self.decoder.try_next_event().await {
                Ok(Some(event)) => {
                    if self.handle(event).is_some() {
                        accepted += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    self.record_failure(e);
                    break;
                }
            }
        }
        accepted
    }

    /// 等待下一个被接受的码
    ///
    /// 会话停止或出错时返回 None (错误原因见 `status()`)。可以安全地在 `select!` 中取消。
    pub async fn next_accepted(&mut self) -> Option<String> {
        loop {
            match self.decoder.next_event().await {
                Ok(Some(event)) => {
                    if let Some(code) = self.handle(event) {
                        return Some(code);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    self.record_failure(e);
                    return None;
                }
            }
        }
    }

    // 原始检测 → 去重门 → 累加器
    fn handle(&mut self, event: DecodeEvent) -> Option<String> {
        self.telemetry.raw_events += 1;

        if !self.gate.admit(&event) {
            self.telemetry.suppressed += 1;
            return None;
        }

        self.telemetry.accepted += 1;
        if !self.accumulator.on_accepted(&event.code) {
            self.telemetry.feedback_failures += 1;
        }
        tracing::info!("Scanned {}", event.code);
        Some(event.code)
    }

    fn record_failure(&mut self, err: ScanError) -> ScanError {
        if err.is_session_fault() {
            self.telemetry.faults += 1;
        }
        tracing::error!("Scan session error: {}", err);
        self.publish(Some(false), Some(err.to_string()));
        err
    }

    fn publish(&self, started: Option<bool>, error: Option<String>) {
        self.status.send_replace(SessionStatus { started, error });
    }

    // --- 只读访问 ---

    /// 本会话累计接受的码 (只增不减)
    pub fn scan_log(&self) -> &[String] {
        self.accumulator.log()
    }

    pub fn subscribe_log(&self) -> watch::Receiver<Vec<String>> {
        self.accumulator.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    pub fn state(&self) -> DecoderState {
        self.decoder.state()
    }

    pub fn selected_device(&self) -> Option<&CaptureDevice> {
        self.selected.as_ref()
    }

    pub fn telemetry(&self) -> &SessionTelemetry {
        &self.telemetry
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
}
