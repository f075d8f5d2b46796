use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::FocusTimerConfig;
use super::timer::PhaseCompletion;

/// Host answer to a notification permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// Desktop/host notification sink
///
/// Both operations are best-effort: the timer ignores any error they return.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the host for permission to show notifications
    async fn request_permission(&self) -> Result<Permission>;

    /// Show a notification
    async fn notify(&self, title: &str, body: &str) -> Result<()>;

    /// Get notifier name for logging
    fn name(&self) -> &str;
}

/// Notifier that writes notifications to the log
///
/// Used when the service runs headless; permission is always granted.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn request_permission(&self) -> Result<Permission> {
        Ok(Permission::Granted)
    }

    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        info!("🔔 {}: {}", title, body);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Title and body shown when a phase completes
pub fn completion_message(
    completion: PhaseCompletion,
    config: &FocusTimerConfig,
) -> (String, String) {
    match completion {
        PhaseCompletion::FocusComplete => (
            "Work session complete! 🎉".to_string(),
            format!(
                "Time for a {}-minute break!",
                config.break_duration.as_secs() / 60
            ),
        ),
        PhaseCompletion::BreakComplete => (
            "Break complete! 💪".to_string(),
            "Ready for another study session?".to_string(),
        ),
    }
}
