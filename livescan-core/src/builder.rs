use std::time::Duration;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::constraints::{FacingMode, RegionOfInterest};
use crate::error::Result;
use crate::symbology::Symbologies;
use crate::vocabulary::LabelVocabulary;

/// 同一个码的重复抑制窗口
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(1500);

/// 选不出摄像头时默认请求后置朝向
pub const DEFAULT_FALLBACK_FACING: FacingMode = FacingMode::Environment;

/// 交给外部解码器的解码选项
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DecoderSettings {
    pub symbologies: Symbologies,
    /// 单帧是否返回多个结果
    pub multiple: bool,
    /// 是否启用整帧定位 (关闭时只在 ROI 内搜索)
    pub locate: bool,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            symbologies: Symbologies::default(),
            multiple: false,
            locate: false,
        }
    }
}

/// 扫描会话配置
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct ScanConfig {
    #[cfg_attr(feature = "serialize", serde(with = "millis"))]
    pub debounce_window: Duration,
    pub roi: RegionOfInterest,
    pub decoder: DecoderSettings,
    pub vocabulary: LabelVocabulary,
    /// 选不出摄像头时的朝向提示，None 表示完全不加约束
    pub fallback_facing: Option<FacingMode>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            roi: RegionOfInterest::BARCODE_BAND,
            decoder: DecoderSettings::default(),
            vocabulary: LabelVocabulary::default(),
            fallback_facing: Some(DEFAULT_FALLBACK_FACING),
        }
    }

    /// 设置去重窗口 (默认 1500ms)
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn roi(mut self, roi: RegionOfInterest) -> Self {
        self.roi = roi;
        self
    }

    /// 设置启用的码制
    pub fn symbologies(mut self, symbologies: Symbologies) -> Self {
        self.decoder.symbologies = symbologies;
        self
    }

    pub fn decoder(mut self, decoder: DecoderSettings) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn vocabulary(mut self, vocabulary: LabelVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn fallback_facing(mut self, facing: Option<FacingMode>) -> Self {
        self.fallback_facing = facing;
        self
    }

    /// 启动会话前的检查
    pub fn validate(&self) -> Result<()> {
        self.roi.validate()?;
        if self.decoder.symbologies.is_empty() {
            return Err(crate::error::ScanError::InvalidConfig(
                "at least one symbology must be enabled".into(),
            ));
        }
        Ok(())
    }

    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "serialize")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
