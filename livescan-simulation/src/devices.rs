use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use livescan_core::device::CaptureDevice;
use livescan_core::error::{Result, ScanError};
use livescan_core::traits::MediaDevices;

use crate::BACKEND;

/// 仿真的媒体设备注册表
#[derive(Debug)]
pub struct SimulatedDevices {
    platform: String,
    devices: Vec<CaptureDevice>,
    enumeration: bool,
    failure: Option<String>,
    list_calls: AtomicUsize,
}

impl SimulatedDevices {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self {
            platform: String::from("simulated browser"),
            devices: devices
                .into_iter()
                .map(|d| d.with_backend(BACKEND))
                .collect(),
            enumeration: true,
            failure: None,
            list_calls: AtomicUsize::new(0),
        }
    }

    /// 由 (id, label) 快速构造
    pub fn with_labels(labels: &[(&str, &str)]) -> Self {
        Self::new(
            labels
                .iter()
                .map(|(id, label)| CaptureDevice::new(*id, *label))
                .collect(),
        )
    }

    /// 完全没有枚举能力的平台
    pub fn unsupported(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            enumeration: false,
            ..Self::new(vec![])
        }
    }

    /// 枚举调用会失败
    pub fn failing(mut self, cause: impl Into<String>) -> Self {
        self.failure = Some(cause.into());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaDevices for SimulatedDevices {
    fn supports_enumeration(&self) -> bool {
        self.enumeration
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    async fn list_devices(&self) -> Result<Vec<CaptureDevice>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if !self.enumeration {
            return Err(ScanError::MediaAccessUnsupported {
                platform: self.platform.clone(),
            });
        }
        if let Some(cause) = &self.failure {
            return Err(ScanError::Platform(cause.clone()));
        }

        tracing::debug!("Simulated registry returns {} devices", self.devices.len());
        Ok(self.devices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livescan_core::device::Facing;

    #[tokio::test]
    async fn lists_labelled_devices() {
        let registry =
            SimulatedDevices::with_labels(&[("a", "Front Camera"), ("b", "Back Camera")]);
        let devices = registry.list_devices().await.unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].facing, Facing::Back);
        assert_eq!(devices[1].backend, BACKEND);
        assert_eq!(registry.list_calls(), 1);
    }

    #[tokio::test]
    async fn failing_registry_returns_platform_error() {
        let registry = SimulatedDevices::new(vec![]).failing("NotAllowedError");
        assert_eq!(
            registry.list_devices().await.unwrap_err(),
            ScanError::Platform("NotAllowedError".into())
        );
    }
}
