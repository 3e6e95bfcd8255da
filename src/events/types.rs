//! User-visible notification types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a notification, mirrors the toast variant shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast-style message raised by a note operation
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Short headline, e.g. "Error saving note"
    pub title: String,
    pub description: String,
    /// The note the operation targeted, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<Uuid>,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl Notification {
    fn new(level: NotificationLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
            note_id: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, description)
    }

    /// Attach the note this notification is about
    pub fn with_note(mut self, note_id: Uuid) -> Self {
        self.note_id = Some(note_id);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Anything that can surface notifications to the user.
///
/// Implementations must be fire-and-forget: `notify` never blocks and never
/// fails from the caller's point of view.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    /// Report a failed operation on a note
    fn notify_error(&self, title: &str, description: &str, note_id: Option<Uuid>) {
        let mut n = Notification::error(title, description);
        n.note_id = note_id;
        self.notify(n);
    }

    /// Report a successful operation
    fn notify_success(&self, description: &str, note_id: Option<Uuid>) {
        let mut n = Notification::success("Success", description);
        n.note_id = note_id;
        self.notify(n);
    }
}
