use std::sync::OnceLock;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::device::Facing;

static BUILTIN: OnceLock<LabelVocabulary> = OnceLock::new();

/// 设备标签词表
///
/// 厂商提供的 label 既不可靠又随语言变化，所以朝向/主副摄判断全部基于可配置的词表，
/// 而不是写死的条件分支。新的厂商命名只需要往词表里加词。
///
/// 匹配规则：label 小写后做子串匹配。同时命中两个对立词表 (back + front，
/// primary + secondary) 视为 "没有信号"。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct LabelVocabulary {
    /// 后置 / 环境朝向
    pub back: Vec<String>,
    /// 前置 / 用户朝向
    pub front: Vec<String>,
    /// 主摄 / 默认传感器
    pub primary: Vec<String>,
    /// 副摄 (广角、长焦、深度 ...)
    pub secondary: Vec<String>,
}

/// 传感器角色，排序即偏好顺序 (Primary 最优)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum SensorRole {
    Primary,
    Unknown,
    Secondary,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self {
            back: words(&[
                "back",
                "rear",
                "environment",
                "facing back",
                "world",
                "rück",
                "arrière",
                "trasera",
                "traseira",
                "posteriore",
                "achter",
                "tylna",
                "задн",
                "тыльн",
                "背面",
                "后置",
                "後置",
            ]),
            front: words(&[
                "front",
                "user",
                "selfie",
                "facing front",
                "face",
                "vorder",
                "avant",
                "frontal",
                "frontale",
                "voor",
                "przednia",
                "передн",
                "фронт",
                "前置",
                "正面",
                "前面",
            ]),
            primary: words(&["main", "primary", "default", "camera2 0", "camera 0"]),
            secondary: words(&[
                "wide", "ultra", "tele", "zoom", "depth", "macro", "dual", "triple", "infrared",
                "tof",
            ]),
        }
    }
}

impl LabelVocabulary {
    /// 进程内共享的内置词表
    pub fn builtin() -> &'static LabelVocabulary {
        BUILTIN.get_or_init(LabelVocabulary::default)
    }

    /// 空词表：任何 label 都没有信号
    pub fn empty() -> Self {
        Self {
            back: vec![],
            front: vec![],
            primary: vec![],
            secondary: vec![],
        }
    }

    /// 从 JSON 加载 (缺失字段使用内置默认值)
    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 追加后置词 (例如新的厂商命名)
    pub fn with_back_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.back.extend(terms.into_iter().map(Into::into));
        self
    }

    /// 从 label 推断朝向
    pub fn facing(&self, label: &str) -> Facing {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return Facing::Unknown;
        }
        match (contains_any(&label, &self.back), contains_any(&label, &self.front)) {
            (true, false) => Facing::Back,
            (false, true) => Facing::Front,
            // 两边都命中或都没命中：不猜
            _ => Facing::Unknown,
        }
    }

    /// 从 label 推断传感器角色
    pub fn sensor_role(&self, label: &str) -> SensorRole {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return SensorRole::Unknown;
        }
        match (
            contains_any(&label, &self.primary),
            contains_any(&label, &self.secondary),
        ) {
            (true, false) => SensorRole::Primary,
            (false, true) => SensorRole::Secondary,
            _ => SensorRole::Unknown,
        }
    }
}

fn contains_any(label_lower: &str, terms: &[String]) -> bool {
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .any(|t| label_lower.contains(&t.to_lowercase()))
}
