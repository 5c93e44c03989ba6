use std::time::{Duration, Instant};

use livescan_core::builder::DEFAULT_DEBOUNCE_WINDOW;
use livescan_core::event::DecodeEvent;

/// 去重状态：最后一个被接受的码及其接受时刻
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupState {
    pub last_code: Option<String>,
    pub last_accepted_at: Option<Instant>,
}

/// 纯函数形式的去重判定
///
/// 除非 `code == last_code` 且 `timestamp < last_accepted_at + window`，否则接受。
/// 接受时状态更新为该事件；拒绝时状态不变。
/// 窗口按 "同一个值" 计算，不同的码在窗口内照样接受。
pub fn admit(event: &DecodeEvent, state: &DedupState, window: Duration) -> (bool, DedupState) {
    let repeated = match (&state.last_code, state.last_accepted_at) {
        (Some(last), Some(at)) => *last == event.code && event.timestamp < at + window,
        _ => false,
    };

    if repeated {
        (false, state.clone())
    } else {
        (
            true,
            DedupState {
                last_code: Some(event.code.clone()),
                last_accepted_at: Some(event.timestamp),
            },
        )
    }
}

/// 有状态的去重门，每个会话恰好一个
#[derive(Debug, Clone)]
pub struct DedupGate {
    window: Duration,
    state: DedupState,
}

impl Default for DedupGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl DedupGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DedupState::default(),
        }
    }

    /// 判定并就地更新状态
    pub fn admit(&mut self, event: &DecodeEvent) -> bool {
        let (accept, next) = admit(event, &self.state, self.window);
        if accept {
            self.state = next;
        } else {
            tracing::debug!("Suppressed repeat of {} within {:?}", event.code, self.window);
        }
        accept
    }

    /// 会话重启时清空
    pub fn reset(&mut self) {
        self.state = DedupState::default();
    }

    pub fn state(&self) -> &DedupState {
        &self.state
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
