//! User-facing notifications (toasts)

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Normal,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            ..Self::new(title, description)
        }
    }

    pub fn registration_succeeded() -> Self {
        Self::new(
            "Registration Successful!",
            "Your information has been submitted successfully.",
        )
    }

    pub fn registration_failed() -> Self {
        Self::destructive(
            "Registration Failed",
            "There was an error submitting your registration. Please try again.",
        )
    }

    pub fn directory_unavailable() -> Self {
        Self::destructive("Error", "Failed to load directory")
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Normal => info!(
                "[NOTIFY] {}: {}",
                notification.title, notification.description
            ),
            Severity::Destructive => warn!(
                "[NOTIFY] {}: {}",
                notification.title, notification.description
            ),
        }
    }
}
