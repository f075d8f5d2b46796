//! Pomodoro-style focus timer
//!
//! This module provides:
//! - `FocusTimer`: the pure focus/break countdown state machine
//! - `FocusTimerController`: drives the timer from a cancellable 1-second ticker
//! - `Notifier`: best-effort host notifications on phase completion
//! - Study statistics (completed sessions, streak, total focus time)

mod config;
mod controller;
mod notify;
mod stats;
mod timer;

pub use config::FocusTimerConfig;
pub use controller::{FocusTimerController, TimerEvent, TICK_INTERVAL};
pub use notify::{completion_message, LogNotifier, Notifier, Permission};
pub use stats::{format_study_hours, StudyStats};
pub use timer::{format_mmss, FocusTimer, Phase, PhaseCompletion, TimerSnapshot};
