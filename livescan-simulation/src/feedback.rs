use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use livescan_core::error::{Result, ScanError};
use livescan_core::traits::{Feedback, PermissionProvider, PermissionStatus};

/// 记录 beep 次数的反馈
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    beeps: AtomicUsize,
    broken: bool,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次 beep 都失败 (例如浏览器禁止自动播放)，但仍然计数
    pub fn broken() -> Self {
        Self {
            beeps: AtomicUsize::new(0),
            broken: true,
        }
    }

    pub fn beeps(&self) -> usize {
        self.beeps.load(Ordering::SeqCst)
    }
}

impl Feedback for RecordingFeedback {
    fn beep(&self) -> Result<()> {
        self.beeps.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(ScanError::Platform("audio output unavailable".into()));
        }
        Ok(())
    }
}

/// 固定返回结果的权限协作方
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPermission(pub PermissionStatus);

#[async_trait]
impl PermissionProvider for ScriptedPermission {
    async fn request_camera_permission(&self) -> PermissionStatus {
        self.0
    }
}
