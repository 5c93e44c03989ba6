// 开启一些 Clippy 检查，保证代码质量
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

// 模块定义
pub mod builder;
pub mod constraints;
pub mod device;
pub mod error;
pub mod event;
pub mod symbology;
pub mod telemetry;
pub mod time;
pub mod traits;
pub mod vocabulary;

// 方便用户使用的 Prelude
pub mod prelude {
    pub use crate::builder::{
        DecoderSettings, ScanConfig, DEFAULT_DEBOUNCE_WINDOW, DEFAULT_FALLBACK_FACING,
    };
    pub use crate::constraints::{
        CaptureConstraints, FacingMode, RegionOfInterest, RenderTarget, StreamConfig,
    };
    pub use crate::device::{CaptureDevice, Facing};
    pub use crate::error::{Result, ScanError};
    pub use crate::event::{DecodeEvent, DecoderSignal, DetectionSink};
    pub use crate::symbology::Symbologies;
    pub use crate::telemetry::SessionTelemetry;
    pub use crate::time::{Clock, ManualClock, SystemClock};
    pub use crate::traits::{
        Feedback, LiveDecoder, MediaDevices, PermissionProvider, PermissionStatus, Silent,
    };
    pub use crate::vocabulary::{LabelVocabulary, SensorRole};
}

// 重新导出依赖中的关键类型，避免用户版本冲突
pub use async_trait::async_trait;

// 版本与构建信息常量
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
