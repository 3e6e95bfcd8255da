//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating notes with sensible defaults,
//! and a harness wiring a `NoteCollection` to in-memory collaborators.
#![allow(dead_code)]

use crate::auth::{Session, StaticSession};
use crate::events::{Notification, NotificationBus};
use crate::notes::{CollectionConfig, Note, NoteCollection, Position};
use crate::store::mock::MockNoteStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Debounce used by tests: short enough to keep tests fast
pub const TEST_DEBOUNCE_MS: u64 = 40;

/// A collection wired to a mock store, a replaceable session and a bus
pub struct Harness {
    pub store: Arc<MockNoteStore>,
    pub session: Arc<StaticSession>,
    pub bus: NotificationBus,
    pub notifications: broadcast::Receiver<Notification>,
    pub collection: NoteCollection,
    pub user_id: Uuid,
    pub material_id: Uuid,
}

impl Harness {
    /// Everything received on the bus so far
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }

    pub fn sign_out(&self) {
        self.session.set(None);
    }
}

pub fn test_config() -> CollectionConfig {
    CollectionConfig {
        debounce: Duration::from_millis(TEST_DEBOUNCE_MS),
        ..CollectionConfig::default()
    }
}

/// Signed-in harness over an empty store
pub fn harness() -> Harness {
    harness_with(MockNoteStore::new(), Uuid::new_v4(), Uuid::new_v4())
}

/// Signed-in harness over a pre-seeded store
pub fn harness_with(store: MockNoteStore, user_id: Uuid, material_id: Uuid) -> Harness {
    let store = Arc::new(store);
    let session = Arc::new(StaticSession::new(Some(Session::new(user_id))));
    let bus = NotificationBus::default();
    let notifications = bus.subscribe();
    let collection = NoteCollection::new(
        store.clone(),
        session.clone(),
        Arc::new(bus.clone()),
        test_config(),
    )
    .expect("valid test config");

    Harness {
        store,
        session,
        bus,
        notifications,
        collection,
        user_id,
        material_id,
    }
}

/// A stored note with the given content
pub fn test_note(material_id: Uuid, user_id: Uuid, content: &str) -> Note {
    let mut note = Note::new(material_id, user_id, Position::new(10.0, 20.0));
    note.content = content.to_string();
    note
}

/// A stored note already minimized
pub fn minimized_note(material_id: Uuid, user_id: Uuid, content: &str) -> Note {
    let mut note = test_note(material_id, user_id, content);
    note.is_minimized = true;
    note
}
