use serde::{Deserialize, Serialize};

/// Running totals for the current process lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    /// Number of completed focus phases
    pub completed_sessions: u64,

    /// Consecutive focus phases completed since the stats were created
    pub streak: u64,

    /// Total minutes spent in completed focus phases
    pub total_focus_minutes: u64,
}

impl StudyStats {
    /// Record one completed focus phase of the given length
    pub fn record_focus(&mut self, focus_secs: u64) {
        self.completed_sessions += 1;
        self.streak += 1;
        self.total_focus_minutes += focus_secs / 60;
    }

    /// Total study time as shown on the study page, e.g. `"1.5h"`
    pub fn total_time_display(&self) -> String {
        format_study_hours(self.total_focus_minutes)
    }
}

/// Format minutes as hours with a single tenths digit
///
/// The tenths digit counts whole 6-minute blocks, so 90 minutes is `"1.5h"`
/// and 5 minutes is `"0.0h"`.
pub fn format_study_hours(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{}.{}h", hours, mins / 6)
}
