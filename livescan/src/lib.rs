pub mod accumulator;
pub mod backend;
pub mod blocking;
pub mod configurator;
pub mod decoder_session;
pub mod dedup;
pub(crate) mod internal; // 内部模块，不对外暴露
pub mod permission;
pub mod selector;
pub mod session;

// Re-export 核心 crate，方便下游只依赖 livescan
pub use livescan_core;

pub use configurator::build_constraints;
pub use selector::select_camera;
pub use session::ScanSession;

/// 预置模块，用户可以通过 `use livescan::prelude::*;` 导入常用项
pub mod prelude {
    pub use crate::blocking::BlockingScanner;
    pub use crate::configurator::{build_constraints, configure};
    pub use crate::decoder_session::DecoderState;
    pub use crate::dedup::{DedupGate, DedupState};
    pub use crate::permission::ensure_camera_access;
    pub use crate::selector::{select_camera, CameraSelector, LabelRank, LabelRanker};
    pub use crate::session::{ScanSession, SessionStatus};
    pub use livescan_core::prelude::*;
}
