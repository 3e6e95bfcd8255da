//! Notification bus for broadcasting toasts to whoever renders them

use super::{Notification, NotificationSink};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// Bus that distributes notifications via `tokio::sync::broadcast`
///
/// Fire-and-forget: notifying never blocks, never panics.
/// If no subscribers are connected, notifications are silently dropped.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a new bus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for NotificationBus {
    fn notify(&self, notification: Notification) {
        let level = format!("{:?}", notification.level);
        let title = notification.title.clone();
        match self.sender.send(notification) {
            Ok(n) => {
                debug!(
                    level = %level,
                    title = %title,
                    subscribers = n,
                    "Notification emitted"
                );
            }
            Err(_) => {
                // No subscribers
            }
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
