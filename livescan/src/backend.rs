use std::sync::Arc;

use async_trait::async_trait;
use livescan_core::device::CaptureDevice;
use livescan_core::error::{Result, ScanError};
use livescan_core::traits::MediaDevices;

/// 后端枚举，用于内部标记当前使用的是哪个设备清单实现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    V4L2,
    Unsupported, // 没有枚举能力的平台
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "linux-v4l2", target_os = "linux"))] {
        /// 创建当前平台的设备清单
        pub fn default_media_devices() -> Arc<dyn MediaDevices> {
            livescan_backend_v4l2::default_media_devices()
        }

        pub fn default_backend() -> BackendType {
            BackendType::V4L2
        }
    } else {
        /// 创建当前平台的设备清单
        pub fn default_media_devices() -> Arc<dyn MediaDevices> {
            Arc::new(UnsupportedPlatform::new(platform_class()))
        }

        pub fn default_backend() -> BackendType {
            BackendType::Unsupported
        }
    }
}

/// 当前编译目标的平台类别，用于 "不支持" 提示
pub fn platform_class() -> String {
    format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH)
}

/// 没有设备枚举能力的平台
///
/// 会话在做任何其它事情之前就会因为它中止。
#[derive(Debug, Clone)]
pub struct UnsupportedPlatform {
    platform: String,
}

impl UnsupportedPlatform {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

#[async_trait]
impl MediaDevices for UnsupportedPlatform {
    fn supports_enumeration(&self) -> bool {
        false
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    async fn list_devices(&self) -> Result<Vec<CaptureDevice>> {
        Err(ScanError::MediaAccessUnsupported {
            platform: self.platform.clone(),
        })
    }
}
