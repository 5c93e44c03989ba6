use livescan_core::error::{Result, ScanError};
use livescan_core::traits::{PermissionProvider, PermissionStatus};

/// 授权被拒绝时展示给用户的提示
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Please grant camera permission to use the barcode scanner.";

/// 启动会话前的授权检查
///
/// `Granted` 与 `Limited` 都允许采集；拒绝时返回 `PermissionDenied`，由调用方弹窗提示。
pub async fn ensure_camera_access(provider: &dyn PermissionProvider) -> Result<PermissionStatus> {
    let status = provider.request_camera_permission().await;
    if status.allows_capture() {
        tracing::debug!("Camera permission: {:?}", status);
        Ok(status)
    } else {
        tracing::warn!("Camera permission denied");
        Err(ScanError::PermissionDenied(PERMISSION_DENIED_MESSAGE.into()))
    }
}
