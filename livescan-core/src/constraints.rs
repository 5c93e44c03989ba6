use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::builder::DecoderSettings;
use crate::error::{Result, ScanError};

/// 粗粒度的朝向请求，只在不知道具体设备 ID 时使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum FacingMode {
    /// 背向用户 (后置)
    Environment,
    /// 面向用户 (前置)
    User,
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => f.write_str("environment"),
            FacingMode::User => f.write_str("user"),
        }
    }
}

/// 采集约束
///
/// 明确的设备 ID 与朝向提示互斥，用 enum 表达 "恰好一个"。
/// `Unconstrained` 只在既没有设备也没有朝向提示时出现。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum CaptureConstraints {
    Device(String),
    Facing(FacingMode),
    #[default]
    Unconstrained,
}

impl CaptureConstraints {
    pub fn device_id(&self) -> Option<&str> {
        match self {
            CaptureConstraints::Device(id) => Some(id),
            _ => None,
        }
    }

    pub fn facing_mode(&self) -> Option<FacingMode> {
        match self {
            CaptureConstraints::Facing(mode) => Some(*mode),
            _ => None,
        }
    }
}

/// 感兴趣区域：四条边的内缩百分比
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RegionOfInterest {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl RegionOfInterest {
    /// 固定策略：居中的水平条带，适合一维条码
    pub const BARCODE_BAND: Self = Self {
        top: 25.0,
        right: 10.0,
        bottom: 25.0,
        left: 10.0,
    };

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Result<Self> {
        let roi = Self {
            top,
            right,
            bottom,
            left,
        };
        roi.validate()?;
        Ok(roi)
    }

    /// 每条边在 [0, 100) 内，且对边之和 < 100 (剩余区域非空)
    pub fn validate(&self) -> Result<()> {
        let edges = [self.top, self.right, self.bottom, self.left];
        if edges.iter().any(|e| !e.is_finite() || *e < 0.0 || *e >= 100.0) {
            return Err(ScanError::InvalidConfig(format!(
                "ROI insets must be within 0..100%, got {}",
                self
            )));
        }
        if self.top + self.bottom >= 100.0 || self.left + self.right >= 100.0 {
            return Err(ScanError::InvalidConfig(format!(
                "ROI leaves no visible area: {}",
                self
            )));
        }
        Ok(())
    }
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self::BARCODE_BAND
    }
}

impl fmt::Display for RegionOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top: {}%, right: {}%, bottom: {}%, left: {}%",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// 渲染目标的不透明句柄 (DOM 节点选择器、原生 View 句柄 ...)
///
/// Core 只接收它并转交给解码器，从不自己构造内部含义。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget(String);

impl RenderTarget {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 交给 LiveDecoder 的完整流配置
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub constraints: CaptureConstraints,
    pub roi: RegionOfInterest,
    pub decoder: DecoderSettings,
}
