//! Focus/break countdown state machine.
//!
//! [`FocusTimer`] holds no clock of its own: the controller calls
//! [`FocusTimer::tick`] once per elapsed second while the timer is running.

use serde::{Deserialize, Serialize};

use super::config::FocusTimerConfig;
use super::stats::StudyStats;

/// Which interval of the cycle is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

/// Emitted when a phase counts down to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseCompletion {
    /// A focus phase finished; the timer moved to a break
    FocusComplete,
    /// A break finished; the timer moved back to focus
    BreakComplete,
}

/// Point-in-time view of the timer for observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_secs: u64,
    pub is_running: bool,
    pub completed_sessions: u64,
    /// Fraction of the current phase already elapsed (0.0 - 1.0)
    pub progress: f64,
    /// Remaining time as `MM:SS`
    pub display: String,
    pub stats: StudyStats,
}

/// Pomodoro-style countdown alternating focus and break phases
#[derive(Debug, Clone)]
pub struct FocusTimer {
    config: FocusTimerConfig,
    phase: Phase,
    remaining_secs: u64,
    running: bool,
    stats: StudyStats,
}

impl FocusTimer {
    /// Create a stopped timer at the start of a focus phase
    pub fn new(config: FocusTimerConfig) -> Self {
        let remaining_secs = config.focus_secs();
        Self {
            config,
            phase: Phase::Focus,
            remaining_secs,
            running: false,
            stats: StudyStats::default(),
        }
    }

    /// Length of the given phase in seconds
    pub fn phase_duration(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.config.focus_secs(),
            Phase::Break => self.config.break_secs(),
        }
    }

    /// Start or resume the countdown.
    ///
    /// Returns false when the timer was already running or the phase has no
    /// time left to count.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining_secs == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop counting. Returns true if the timer was running.
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero completes the phase within the same tick, so the timer is
    /// never left at zero while running.
    pub fn tick(&mut self) -> Option<PhaseCompletion> {
        if !self.running {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if self.remaining_secs == 0 {
            Some(self.complete_phase())
        } else {
            None
        }
    }

    fn complete_phase(&mut self) -> PhaseCompletion {
        self.running = false;

        match self.phase {
            Phase::Focus => {
                self.stats.record_focus(self.config.focus_secs());
                self.phase = Phase::Break;
                self.remaining_secs = self.config.break_secs();
                PhaseCompletion::FocusComplete
            }
            Phase::Break => {
                self.phase = Phase::Focus;
                self.remaining_secs = self.config.focus_secs();
                PhaseCompletion::BreakComplete
            }
        }
    }

    /// Return to a stopped focus phase. Study stats are kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Focus;
        self.remaining_secs = self.config.focus_secs();
    }

    /// Fraction of the current phase already elapsed (0.0 - 1.0)
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        let total = self.phase_duration(self.phase);
        if total == 0 {
            return 1.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_sessions(&self) -> u64 {
        self.stats.completed_sessions
    }

    pub fn stats(&self) -> StudyStats {
        self.stats
    }

    pub fn config(&self) -> &FocusTimerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            is_running: self.running,
            completed_sessions: self.stats.completed_sessions,
            progress: self.progress_fraction(),
            display: format_mmss(self.remaining_secs),
            stats: self.stats,
        }
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
