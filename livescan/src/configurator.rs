use livescan_core::builder::ScanConfig;
use livescan_core::constraints::{CaptureConstraints, StreamConfig};
use livescan_core::device::CaptureDevice;

/// 根据选中的设备生成采集约束，永远不会失败
///
/// - 有设备：只给设备 ID
/// - 没有设备：只给 `facingMode: environment`
///
/// 两种情况都附带固定的 ROI。
pub fn build_constraints(selected: Option<&CaptureDevice>) -> StreamConfig {
    configure(selected, &ScanConfig::default())
}

/// 同 `build_constraints`，但 ROI、解码选项与朝向兜底取自配置
pub fn configure(selected: Option<&CaptureDevice>, config: &ScanConfig) -> StreamConfig {
    let constraints = match selected {
        // 有明确设备就只用设备 ID
        Some(device) => CaptureConstraints::Device(device.id.clone()),
        // 否则告诉平台我们想要后置摄像头 (平台不一定理会)
        None => match config.fallback_facing {
            Some(mode) => CaptureConstraints::Facing(mode),
            None => CaptureConstraints::Unconstrained,
        },
    };

    StreamConfig {
        constraints,
        roi: config.roi,
        decoder: config.decoder.clone(),
    }
}
