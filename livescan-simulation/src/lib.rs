//! 仿真后端：脚本化的设备清单、实时解码器与反馈
//!
//! 用于单元测试、集成测试和没有摄像头的演示环境。

pub mod decoder;
pub mod devices;
pub mod feedback;

pub use decoder::{DecoderHandle, ScriptedDecoder};
pub use devices::SimulatedDevices;
pub use feedback::{RecordingFeedback, ScriptedPermission};

/// 仿真后端的标识
pub const BACKEND: &str = "Simulation";
