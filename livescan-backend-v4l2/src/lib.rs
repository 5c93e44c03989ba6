#![cfg(target_os = "linux")]

pub mod device;

use async_trait::async_trait;
use livescan_core::device::CaptureDevice;
use livescan_core::error::Result;
use livescan_core::traits::MediaDevices;
use std::sync::Arc;

/// V4L2 设备清单
/// 通常作为全局单例存在
#[derive(Debug, Clone)]
pub struct V4l2Devices;

impl Default for V4l2Devices {
    fn default() -> Self {
        Self::new()
    }
}

impl V4l2Devices {
    pub fn new() -> Self {
        Self
    }
}

// 实现 MediaDevices Trait
#[async_trait]
impl MediaDevices for V4l2Devices {
    fn supports_enumeration(&self) -> bool {
        // V4L2 节点总是通过 /dev 暴露，没有摄像头时只是列表为空
        true
    }

    fn platform(&self) -> &str {
        "Linux (V4L2)"
    }

    async fn list_devices(&self) -> Result<Vec<CaptureDevice>> {
        device::list_devices()
    }
}

// 为了方便直接使用，提供一个默认实例
pub fn default_media_devices() -> Arc<dyn MediaDevices> {
    Arc::new(V4l2Devices::new())
}
