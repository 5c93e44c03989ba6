use v4l::capability::Flags;

use livescan_core::device::CaptureDevice;
use livescan_core::error::Result;

/// 后端标识
pub const BACKEND: &str = "V4L2";

/// 枚举系统中的摄像头设备
///
/// 单个节点打不开或查询失败只会被跳过，不会让整个枚举失败。
pub fn list_devices() -> Result<Vec<CaptureDevice>> {
    let mut devices = Vec::new();

    // 遍历 /dev/video* 节点
    for node in v4l::context::enum_devices() {
        let path = node.path().to_string_lossy().to_string();

        let dev = match v4l::Device::with_path(&path) {
            Ok(dev) => dev,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path, e);
                continue;
            }
        };

        match dev.query_caps() {
            // 过滤：必须支持 Video Capture，忽略 Metadata 设备或 Output 设备
            Ok(caps) if caps.capabilities.contains(Flags::VIDEO_CAPTURE) => {
                // 没有名称时留空，交给选择器当作 "无信号"
                let label = node.name().unwrap_or_default();
                devices.push(CaptureDevice::new(path, label).with_backend(BACKEND));
            }
            Ok(_) => tracing::trace!("Skipping non-capture node {}", path),
            Err(e) => tracing::debug!("Failed to query {}: {}", path, e),
        }
    }

    tracing::info!("Found {} V4L2 capture devices", devices.len());
    Ok(devices)
}
