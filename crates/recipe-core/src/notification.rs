//! User notification capability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        };
        f.write_str(label)
    }
}

/// Display options for a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyOptions {
    /// How long the notification stays visible, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Opaque identifier of a shown notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationHandle(pub String);

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn notify_with(
        &self,
        kind: NotificationKind,
        message: &str,
        options: NotifyOptions,
    ) -> NotificationHandle;

    fn notify(&self, kind: NotificationKind, message: &str) -> NotificationHandle {
        self.notify_with(kind, message, NotifyOptions::default())
    }
}
