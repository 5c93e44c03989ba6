use std::fmt;
use std::sync::Arc;

use livescan_core::device::{CaptureDevice, Facing};
use livescan_core::vocabulary::{LabelVocabulary, SensorRole};

/// 对单个 label 的评估结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRank {
    pub facing: Facing,
    pub sensor: SensorRole,
}

/// 可注入的 label 排名函数
///
/// label 匹配天然是模糊的 (厂商、语言各不相同)，所以独立成 trait，
/// 新的命名模式只需换一个 ranker，不需要动会话逻辑。
pub trait LabelRanker: Send + Sync {
    fn rank(&self, label: &str) -> LabelRank;
}

impl LabelRanker for LabelVocabulary {
    fn rank(&self, label: &str) -> LabelRank {
        LabelRank {
            facing: self.facing(label),
            sensor: self.sensor_role(label),
        }
    }
}

// 闭包也可以直接作为 ranker
impl<F> LabelRanker for F
where
    F: Fn(&str) -> LabelRank + Send + Sync,
{
    fn rank(&self, label: &str) -> LabelRank {
        self(label)
    }
}

/// 摄像头选择器：纯函数，无副作用
///
/// 策略 (按顺序，先命中者胜)：
/// 1. 只考虑 label 判定为后置的设备，前置设备永远不会被选中
/// 2. 后置设备中，主摄 > 无信号 > 副摄 (广角/长焦/深度)
/// 3. 没有任何后置信号时返回 None，交给朝向提示兜底，不去猜
///
/// 同等排名取清单中靠前的一个，保证确定性。
#[derive(Clone)]
pub struct CameraSelector {
    ranker: Arc<dyn LabelRanker>,
}

impl fmt::Debug for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSelector").finish_non_exhaustive()
    }
}

impl Default for CameraSelector {
    fn default() -> Self {
        Self::new(LabelVocabulary::default())
    }
}

impl CameraSelector {
    pub fn new(vocabulary: LabelVocabulary) -> Self {
        Self::with_ranker(vocabulary)
    }

    pub fn with_ranker(ranker: impl LabelRanker + 'static) -> Self {
        Self::from_shared(Arc::new(ranker))
    }

    /// 与其他组件共享同一个 ranker
    pub fn from_shared(ranker: Arc<dyn LabelRanker>) -> Self {
        Self { ranker }
    }

    pub fn select<'a>(&self, devices: &'a [CaptureDevice]) -> Option<&'a CaptureDevice> {
        let best = devices
            .iter()
            .map(|d| (d, self.ranker.rank(&d.label)))
            .filter(|(_, rank)| rank.facing == Facing::Back)
            // min_by_key 在并列时返回第一个
            .min_by_key(|(_, rank)| rank.sensor)
            .map(|(d, _)| d);

        match best {
            Some(device) => {
                tracing::debug!(
                    "Selected {} ({}) out of {} devices",
                    device.label,
                    device.id,
                    devices.len()
                );
            }
            None => {
                tracing::debug!("No back-facing label among {} devices", devices.len());
            }
        }
        best
    }
}

/// 使用内置词表选择摄像头
pub fn select_camera(devices: &[CaptureDevice]) -> Option<&CaptureDevice> {
    CameraSelector::default().select(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(labels: &[(&str, &str)]) -> Vec<CaptureDevice> {
        labels
            .iter()
            .map(|(id, label)| CaptureDevice::new(*id, *label))
            .collect()
    }

    #[test]
    fn empty_inventory_has_no_preference() {
        assert!(select_camera(&[]).is_none());
    }

    #[test]
    fn prefers_back_camera_regardless_of_order() {
        let forward = devices(&[("a", "Front Camera"), ("b", "Back Camera")]);
        let reversed = devices(&[("b", "Back Camera"), ("a", "Front Camera")]);

        assert_eq!(select_camera(&forward).map(|d| d.id.as_str()), Some("b"));
        assert_eq!(select_camera(&reversed).map(|d| d.id.as_str()), Some("b"));
    }

    #[test]
    fn never_picks_a_front_camera() {
        let front_only = devices(&[("a", "Front Camera"), ("f", "camera2 1, facing front")]);
        assert!(select_camera(&front_only).is_none());
    }

    #[test]
    fn prefers_primary_sensor_over_wide_and_tele() {
        let iphone = devices(&[
            ("uw", "Back Ultra Wide Camera"),
            ("tele", "Back Telephoto Camera"),
            ("main", "Back Camera"),
            ("front", "Front Camera"),
        ]);
        assert_eq!(select_camera(&iphone).map(|d| d.id.as_str()), Some("main"));

        let android = devices(&[
            ("2", "camera2 2, facing back"),
            ("1", "camera2 1, facing front"),
            ("0", "camera2 0, facing back"),
        ]);
        assert_eq!(select_camera(&android).map(|d| d.id.as_str()), Some("0"));
    }

    #[test]
    fn falls_back_to_secondary_when_it_is_the_only_back_camera() {
        let only_wide = devices(&[("a", "Front Camera"), ("w", "Back Dual Wide Camera")]);
        assert_eq!(select_camera(&only_wide).map(|d| d.id.as_str()), Some("w"));
    }

    #[test]
    fn tolerates_missing_and_duplicate_labels() {
        let anonymous = devices(&[
            ("x", ""),
            ("y", "  "),
            ("z", "USB2.0 HD UVC WebCam"),
        ]);
        assert!(select_camera(&anonymous).is_none());

        let duplicated = devices(&[("first", "Back Camera"), ("second", "Back Camera")]);
        assert_eq!(
            select_camera(&duplicated).map(|d| d.id.as_str()),
            Some("first")
        );
    }

    #[test]
    fn accepts_an_injected_ranker() {
        // 某些车载设备把主摄叫做 "cam-main"
        let selector = CameraSelector::with_ranker(|label: &str| LabelRank {
            facing: if label.starts_with("cam-") {
                Facing::Back
            } else {
                Facing::Unknown
            },
            sensor: if label.ends_with("main") {
                SensorRole::Primary
            } else {
                SensorRole::Unknown
            },
        });

        let list = devices(&[("1", "cam-aux"), ("2", "cam-main"), ("3", "Back Camera")]);
        assert_eq!(selector.select(&list).map(|d| d.id.as_str()), Some("2"));
    }

    #[test]
    fn custom_vocabulary_is_honoured() {
        let selector =
            CameraSelector::new(LabelVocabulary::default().with_back_terms(["hauptkamera"]));
        let list = devices(&[("v", "Frontkamera"), ("h", "Hauptkamera")]);
        // 内置词表认不出这个 label，选择器按自己的词表重新判断
        assert_eq!(list[1].facing, Facing::Unknown);
        assert_eq!(selector.select(&list).map(|d| d.id.as_str()), Some("h"));
    }
}
