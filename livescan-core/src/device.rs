#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::vocabulary::LabelVocabulary;

/// 从 label 推断出的摄像头朝向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum Facing {
    Front,
    Back,
    #[default]
    Unknown,
}

/// 视频采集设备基本信息
///
/// 由平台产生，不可变；只在下一次枚举之前有效 (设备可能被拔出或新增)。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CaptureDevice {
    /// 不透明的设备 ID，会话期间稳定 (e.g. "/dev/video0" 或浏览器 deviceId)
    pub id: String,

    /// 厂商提供的显示名称，不可靠，可能为空
    pub label: String,

    /// 由内置词表推断出的朝向，仅供展示
    ///
    /// 摄像头选择不读这个字段，而是用会话配置的词表 (或自定义 ranker) 重新评估 label，
    /// 所以使用自定义词表时两者可能不一致。
    pub facing: Facing,

    /// 后端类型标识 (e.g. "V4L2", "Simulation")
    pub backend: String,
}

impl CaptureDevice {
    /// 创建设备，朝向由内置词表从 label 推断
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            facing: LabelVocabulary::builtin().facing(&label),
            label,
            backend: String::from("unknown"),
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }
}
