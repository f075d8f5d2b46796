use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a focus/break cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTimerConfig {
    /// Length of a focus phase
    /// Default: 1500 seconds (25 minutes)
    pub focus_duration: Duration,

    /// Length of a break phase
    /// Default: 300 seconds (5 minutes)
    pub break_duration: Duration,

    /// Whether phase completions are forwarded to the notifier
    pub notifications: bool,
}

impl FocusTimerConfig {
    /// Build a config from whole minutes, as the settings file expresses them
    pub fn from_minutes(focus_minutes: u64, break_minutes: u64) -> Self {
        Self {
            focus_duration: Duration::from_secs(focus_minutes * 60),
            break_duration: Duration::from_secs(break_minutes * 60),
            ..Self::default()
        }
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_duration.as_secs()
    }

    pub fn break_secs(&self) -> u64 {
        self.break_duration.as_secs()
    }
}

impl Default for FocusTimerConfig {
    fn default() -> Self {
        Self {
            focus_duration: Duration::from_secs(1500), // 25 minutes
            break_duration: Duration::from_secs(300),  // 5 minutes
            notifications: true,
        }
    }
}
