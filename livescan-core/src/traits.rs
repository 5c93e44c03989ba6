use crate::constraints::{RenderTarget, StreamConfig};
use crate::device::CaptureDevice;
use crate::error::Result;
use crate::event::DetectionSink;
use async_trait::async_trait;

/// 摄像头授权结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// 部分授权 (iOS 14+ 的受限模式)，仍然允许采集
    Limited,
}

impl PermissionStatus {
    pub fn allows_capture(&self) -> bool {
        matches!(self, PermissionStatus::Granted | PermissionStatus::Limited)
    }
}

// --- 核心 Trait 定义 ---

/// 1. 设备清单：平台的媒体设备注册表
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// 平台是否具备设备枚举能力 (没有能力 != 枚举到 0 个设备)
    fn supports_enumeration(&self) -> bool;

    /// 平台类别名称，用于 "不支持" 提示
    fn platform(&self) -> &str;

    /// 枚举视频采集设备
    async fn list_devices(&self) -> Result<Vec<CaptureDevice>>;
}

/// 2. 实时解码器：外部的不透明检测器
///
/// 生命周期由会话驱动：`init` (绑定渲染目标 + 协商采集) → `start` (开始处理循环)
/// → `stop` (释放设备与渲染目标)。检测结果通过 `init` 传入的 `DetectionSink` 推送。
#[async_trait]
pub trait LiveDecoder: Send {
    /// 绑定渲染目标并协商采集流，流真正可用后返回
    /// 失败原因应原样返回平台给出的文本
    async fn init(
        &mut self,
        target: &RenderTarget,
        config: &StreamConfig,
        sink: DetectionSink,
    ) -> Result<()>;

    /// 启动内部处理循环，此后开始推送 DecodeEvent
    async fn start(&mut self) -> Result<()>;

    /// 释放采集设备和渲染目标
    async fn stop(&mut self) -> Result<()>;
}

/// 3. 声音反馈：即发即忘
pub trait Feedback: Send + Sync {
    fn beep(&self) -> Result<()>;
}

/// 4. 权限协作方 (弹窗 UI 在外部)
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_camera_permission(&self) -> PermissionStatus;
}

// 为 Box<T> 实现 LiveDecoder，这样 Box<dyn LiveDecoder> 也能被当做 LiveDecoder 使用
#[async_trait]
impl<D: LiveDecoder + ?Sized> LiveDecoder for Box<D> {
    async fn init(
        &mut self,
        target: &RenderTarget,
        config: &StreamConfig,
        sink: DetectionSink,
    ) -> Result<()> {
        (**self).init(target, config, sink).await
    }

    async fn start(&mut self) -> Result<()> {
        (**self).start().await
    }

    async fn stop(&mut self) -> Result<()> {
        (**self).stop().await
    }
}

/// 静音反馈 (无声环境或测试)
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Feedback for Silent {
    fn beep(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_permission_still_allows_capture() {
        assert!(PermissionStatus::Granted.allows_capture());
        assert!(PermissionStatus::Limited.allows_capture());
        assert!(!PermissionStatus::Denied.allows_capture());
    }
}
