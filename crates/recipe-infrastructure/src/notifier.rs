//! [`Notifier`] implementations.

use recipe_core::notification::{NotificationHandle, NotificationKind, Notifier, NotifyOptions};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

fn new_handle() -> NotificationHandle {
    NotificationHandle(Uuid::new_v4().to_string())
}

/// Renders notifications as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_with(
        &self,
        kind: NotificationKind,
        message: &str,
        _options: NotifyOptions,
    ) -> NotificationHandle {
        match kind {
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!(target: "recipe::notify", kind = %kind, "{}", message)
            }
            NotificationKind::Warning => {
                tracing::warn!(target: "recipe::notify", kind = %kind, "{}", message)
            }
            NotificationKind::Error => {
                tracing::error!(target: "recipe::notify", kind = %kind, "{}", message)
            }
        }
        new_handle()
    }
}

/// A notification as delivered to a [`ChannelNotifier`] receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub handle: NotificationHandle,
    pub kind: NotificationKind,
    pub message: String,
    pub options: NotifyOptions,
}

/// Forwards notifications to a channel for a UI layer to display.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify_with(
        &self,
        kind: NotificationKind,
        message: &str,
        options: NotifyOptions,
    ) -> NotificationHandle {
        let handle = new_handle();
        let notification = Notification {
            handle: handle.clone(),
            kind,
            message: message.to_string(),
            options,
        };
        if self.sender.send(notification).is_err() {
            tracing::debug!("[ChannelNotifier] Receiver dropped; discarding: {}", message);
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::new();

        let first = notifier.notify(NotificationKind::Success, "Recipe created successfully");
        notifier.notify_with(
            NotificationKind::Error,
            "Failed to delete recipe: gone",
            NotifyOptions {
                duration_ms: Some(8000),
            },
        );

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.handle, first);
        assert_eq!(received.kind, NotificationKind::Success);

        let received = receiver.try_recv().unwrap();
        assert_eq!(received.message, "Failed to delete recipe: gone");
        assert_eq!(received.options.duration_ms, Some(8000));
    }

    #[test]
    fn test_dropped_receiver_is_tolerated() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        notifier.notify(NotificationKind::Info, "nobody listening");
    }

    #[test]
    fn test_handles_are_unique() {
        let a = TracingNotifier.notify(NotificationKind::Info, "a");
        let b = TracingNotifier.notify(NotificationKind::Info, "b");
        assert_ne!(a, b);
    }
}
