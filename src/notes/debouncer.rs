//! Debounced content persistence for one note.
//!
//! Keystrokes arrive far faster than the store should be written to, so each
//! edit only restarts a quiet-period timer; the latest text is written once
//! the timer elapses without a newer edit.
//!
//! ## Design
//!
//! Uses an mpsc channel + timeout loop:
//! 1. `edit(text)` sends a non-blocking message
//! 2. Background task waits for the first edit, then keeps consuming edits
//!    until `delay` of silence (no new edits)
//! 3. After the quiet period, writes the last text with `update_content`
//! 4. The loop is sequential: writes for one note never overlap
//!
//! `flush()` skips the remaining quiet period. Dropping the debouncer (or
//! calling `cancel()`) discards a pending edit without writing it.
//!
//! A pending edit holds a [`TaskTracker`] token, so waiting on the tracker
//! also waits for debounced writes that have not fired yet.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::events::NotificationSink;
use crate::store::NoteStore;

/// Quiet period observed between the last keystroke and the write
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

enum Command {
    Edit { content: String, token: TaskTrackerToken },
    Flush { token: TaskTrackerToken },
    Cancel,
}

/// Debounced writer of one note's content.
///
/// Non-blocking; the background task lives until the debouncer is dropped.
pub struct ContentDebouncer {
    note_id: Uuid,
    tx: mpsc::UnboundedSender<Command>,
    tracker: TaskTracker,
}

impl ContentDebouncer {
    /// Create a debouncer with its own task tracker.
    pub fn new(
        note_id: Uuid,
        store: Arc<dyn NoteStore>,
        notifier: Arc<dyn NotificationSink>,
        delay: Duration,
    ) -> Self {
        Self::with_tracker(note_id, store, notifier, delay, TaskTracker::new())
    }

    /// Create a debouncer whose pending and in-flight writes count against
    /// `tracker`.
    pub fn with_tracker(
        note_id: Uuid,
        store: Arc<dyn NoteStore>,
        notifier: Arc<dyn NotificationSink>,
        delay: Duration,
        tracker: TaskTracker,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::run_loop(note_id, store, notifier, rx, delay));
        Self {
            note_id,
            tx,
            tracker,
        }
    }

    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    /// Record a new content value and restart the quiet period.
    pub fn edit(&self, content: impl Into<String>) {
        let _ = self.tx.send(Command::Edit {
            content: content.into(),
            token: self.tracker.token(),
        });
    }

    /// Write the pending edit now, if any.
    pub fn flush(&self) {
        let _ = self.tx.send(Command::Flush {
            token: self.tracker.token(),
        });
    }

    /// Drop the pending edit, if any, without writing it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }

    /// Background loop: debounce edits and persist the last one.
    async fn run_loop(
        note_id: Uuid,
        store: Arc<dyn NoteStore>,
        notifier: Arc<dyn NotificationSink>,
        mut rx: mpsc::UnboundedReceiver<Command>,
        delay: Duration,
    ) {
        loop {
            // Wait for the first edit
            let (mut pending, mut token) = match rx.recv().await {
                Some(Command::Edit { content, token }) => (content, token),
                Some(Command::Flush { .. }) | Some(Command::Cancel) => continue,
                None => break, // channel closed, debouncer dropped
            };

            // Debounce: keep consuming edits until quiet period
            let write = loop {
                match tokio::time::timeout(delay, rx.recv()).await {
                    Ok(Some(Command::Edit { content, token: t })) => {
                        pending = content; // new edit arrived, reset timer
                        token = t;
                    }
                    Ok(Some(Command::Flush { token: t })) => {
                        token = t;
                        break true;
                    }
                    Ok(Some(Command::Cancel)) => break false,
                    Ok(None) => {
                        tracing::debug!(note_id = %note_id, "Debouncer dropped with a pending edit");
                        return;
                    }
                    Err(_) => break true, // timeout = quiet period elapsed
                }
            };

            if !write {
                tracing::debug!(note_id = %note_id, "Pending content edit cancelled");
                continue;
            }

            match store.update_content(note_id, &pending).await {
                Ok(()) => {
                    tracing::debug!(
                        note_id = %note_id,
                        chars = pending.chars().count(),
                        "Debounced content saved"
                    );
                }
                Err(e) => {
                    tracing::warn!(note_id = %note_id, error = %e, "Debounced content save failed");
                    notifier.notify_error("Error saving note", &e.to_string(), Some(note_id));
                }
            }
            drop(token);
        }
    }
}
