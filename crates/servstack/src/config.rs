use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the looping stack. Every field has a default so a partial
/// `[stack]` table is enough.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StackConfig {
    /// Number of contiguous copies of the catalogue on the track.
    pub cycles: usize,
    pub wheel_cooldown_ms: u64,
    /// Upper bound on the steps a single wheel event may produce.
    pub max_wheel_steps: u32,
    pub thumb_min_ratio: f64,
    pub usp_stagger_ms: u64,
    /// Added to the item height when there is no second item to measure against.
    pub single_item_gutter: f64,
    /// Used when the surface reports a zero or non-finite spacing.
    pub fallback_spacing: f64,
    pub transition_ms: u64,
    pub detail_focus_delay_ms: u64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            cycles: 3,
            wheel_cooldown_ms: 180,
            max_wheel_steps: 3,
            thumb_min_ratio: 0.12,
            usp_stagger_ms: 70,
            single_item_gutter: 12.0,
            fallback_spacing: 96.0,
            transition_ms: 350,
            detail_focus_delay_ms: 100,
        }
    }
}

impl StackConfig {
    pub fn wheel_cooldown(&self) -> Duration {
        Duration::from_millis(self.wheel_cooldown_ms)
    }

    pub fn usp_stagger(&self) -> Duration {
        Duration::from_millis(self.usp_stagger_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn detail_focus_delay(&self) -> Duration {
        Duration::from_millis(self.detail_focus_delay_ms)
    }
}
