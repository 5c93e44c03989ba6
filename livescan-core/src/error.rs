use thiserror::Error;

/// 扫描会话的错误分类
///
/// 所有错误都在会话边界被吸收 (不会让宿主进程崩溃)，并且没有任何一处自动重试：
/// 每次重试都必须由调用方显式发起。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// 平台根本没有设备枚举能力 (区别于 "枚举到 0 个设备")
    #[error("Camera access is not supported on {platform}. Please use Chrome on Android or Safari on iOS")]
    MediaAccessUnsupported { platform: String },

    /// 枚举调用本身失败，可由用户手动重试
    #[error("Failed to enumerate devices: {0}")]
    EnumerationFailed(String),

    /// 解码器拒绝了约束 (设备 ID 过期、分辨率不支持、设备被占用)
    #[error("Initialization error: {0}")]
    InitializationFailed(String),

    /// 进入 Running 之后解码器崩溃或采集流中断
    #[error("Decoder fault: {0}")]
    RuntimeDecoderFault(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 后端原始错误，尚未按生命周期阶段归类
    #[error("{0}")]
    Platform(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ScanError {
    /// 按初始化阶段归类：原因文本原样保留
    pub fn into_init_failure(self) -> Self {
        match self {
            e @ (ScanError::InitializationFailed(_)
            | ScanError::MediaAccessUnsupported { .. }) => e,
            other => ScanError::InitializationFailed(other.cause()),
        }
    }

    /// 按运行阶段归类
    pub fn into_runtime_fault(self) -> Self {
        match self {
            e @ ScanError::RuntimeDecoderFault(_) => e,
            other => ScanError::RuntimeDecoderFault(other.cause()),
        }
    }

    /// 去掉分类前缀后的原始原因
    pub fn cause(&self) -> String {
        match self {
            ScanError::EnumerationFailed(msg)
            | ScanError::InitializationFailed(msg)
            | ScanError::RuntimeDecoderFault(msg)
            | ScanError::PermissionDenied(msg)
            | ScanError::InvalidConfig(msg)
            | ScanError::Platform(msg)
            | ScanError::Io(msg) => msg.clone(),
            e @ ScanError::MediaAccessUnsupported { .. } => e.to_string(),
        }
    }

    /// 该错误是否意味着会话进入了 Errored 终态
    pub fn is_session_fault(&self) -> bool {
        matches!(
            self,
            ScanError::InitializationFailed(_) | ScanError::RuntimeDecoderFault(_)
        )
    }
}

// std::io::Error 不是 Clone，这里只保留文本
impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Io(e.to_string())
    }
}

#[cfg(feature = "serialize")]
impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_errors_keep_their_text_when_classified() {
        let e = ScanError::Platform("NotReadableError: device busy".into()).into_init_failure();
        assert_eq!(
            e,
            ScanError::InitializationFailed("NotReadableError: device busy".into())
        );
        assert_eq!(e.to_string(), "Initialization error: NotReadableError: device busy");
    }

    #[test]
    fn already_classified_errors_are_not_rewrapped() {
        let e = ScanError::RuntimeDecoderFault("stream ended".into()).into_runtime_fault();
        assert_eq!(e, ScanError::RuntimeDecoderFault("stream ended".into()));

        let io: ScanError = std::io::Error::other("pipe closed").into();
        assert_eq!(
            io.into_runtime_fault(),
            ScanError::RuntimeDecoderFault("pipe closed".into())
        );
    }

    #[test]
    fn unsupported_message_names_the_platform() {
        let e = ScanError::MediaAccessUnsupported {
            platform: "desktop Firefox".into(),
        };
        assert!(e.to_string().contains("desktop Firefox"));
        assert!(!e.is_session_fault());
    }
}
