//! End-to-end note collection scenarios through the public API

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use study_notes::auth::{Session, StaticSession};
use study_notes::error::StoreError;
use study_notes::events::{Notification, NotificationBus};
use study_notes::notes::{CollectionConfig, Note, NoteCollection, Position, Viewport};
use study_notes::store::{NoteStore, RestNoteStore};
use tokio::sync::broadcast;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal in-memory store keeping rows in insertion order
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<Note>>,
}

impl MemoryStore {
    fn rows(&self) -> Vec<Note> {
        self.rows.lock().unwrap().clone()
    }

    fn with_row<F: FnOnce(&mut Note)>(&self, id: Uuid, f: F) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::NotFound(id))?;
        f(row);
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn list(&self, material_id: Uuid, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .filter(|n| n.material_id == material_id && n.user_id == user_id)
            .collect())
    }

    async fn create(
        &self,
        material_id: Uuid,
        user_id: Uuid,
        position: Position,
    ) -> Result<Note, StoreError> {
        let note = Note::new(material_id, user_id, position);
        self.rows.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<(), StoreError> {
        self.with_row(id, |n| n.content = content.to_string())
    }

    async fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<(), StoreError> {
        self.with_row(id, |n| n.position = Position::new(x, y))
    }

    async fn update_minimized(&self, id: Uuid, is_minimized: bool) -> Result<(), StoreError> {
        self.with_row(id, |n| n.is_minimized = is_minimized)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.rows.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

fn config() -> CollectionConfig {
    CollectionConfig {
        debounce: Duration::from_millis(30),
        ..CollectionConfig::default()
    }
}

fn drain(rx: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

#[tokio::test]
async fn test_add_minimize_delete_lifecycle() {
    let store = Arc::new(MemoryStore::default());
    let user_id = Uuid::new_v4();
    let material_id = Uuid::new_v4();
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();
    let collection = NoteCollection::new(
        store.clone(),
        Arc::new(StaticSession::new(Some(Session::new(user_id)))),
        Arc::new(bus.clone()),
        config(),
    )
    .unwrap();

    assert_eq!(collection.open(material_id).await.unwrap(), 0);

    // Add
    let note = collection.add_note(Viewport::new(1000.0, 800.0)).await.unwrap();
    assert_eq!(collection.visible().len(), 1);
    assert!(collection.minimized().is_empty());
    assert!(note.position.x <= 400.0 && note.position.y <= 320.0);

    // Type, drag and minimize through the widget
    let mut widget = collection.widget(note.id).unwrap();
    widget.edit("Eigen");
    widget.edit("Eigenvalues of A");
    widget.pointer_down(note.position);
    widget.pointer_move(Position::new(640.0, 128.0));
    widget.pointer_up();
    widget.minimize();

    assert!(collection.visible().is_empty());
    assert_eq!(
        collection.minimized_summaries(),
        vec![(note.id, "Eigenvalues of A".to_string())]
    );

    collection.settle().await;
    let row = &store.rows()[0];
    assert_eq!(row.content, "Eigenvalues of A");
    assert_eq!(row.position, Position::new(640.0, 128.0));
    assert!(row.is_minimized);

    // Delete from the minimized panel
    widget.delete();
    assert!(collection.notes().is_empty());
    collection.settle().await;
    assert!(store.rows().is_empty());

    let descriptions: Vec<String> = drain(&mut rx).into_iter().map(|n| n.description).collect();
    assert_eq!(
        descriptions,
        vec!["Note added successfully", "Note deleted successfully"]
    );
}

#[tokio::test]
async fn test_reopening_material_shows_persisted_state() {
    let store = Arc::new(MemoryStore::default());
    let user_id = Uuid::new_v4();
    let material_id = Uuid::new_v4();
    let session = Arc::new(StaticSession::new(Some(Session::new(user_id))));
    let collection = NoteCollection::new(
        store.clone(),
        session,
        Arc::new(NotificationBus::default()),
        config(),
    )
    .unwrap();

    collection.open(material_id).await.unwrap();
    let first = collection.add_note(Viewport::default()).await.unwrap();
    let second = collection.add_note(Viewport::default()).await.unwrap();
    collection.update_content(first.id, "kept").unwrap();
    collection.set_minimized(second.id, true).unwrap();

    // Leaving the material flushes the pending edit
    collection.close();
    collection.settle().await;
    assert!(collection.notes().is_empty());

    collection.open(Uuid::new_v4()).await.unwrap();
    assert!(collection.notes().is_empty());

    collection.open(material_id).await.unwrap();
    assert_eq!(collection.visible().len(), 1);
    assert_eq!(collection.visible()[0].content, "kept");
    assert_eq!(collection.minimized()[0].id, second.id);
}

#[tokio::test]
async fn test_backend_outage_surfaces_as_notifications() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/material_notes"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "service unavailable"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/material_notes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = Arc::new(StaticSession::new(Some(Session::new(Uuid::new_v4()))));
    let store = Arc::new(RestNoteStore::new(&server.uri(), "anon", session.clone()).unwrap());
    let bus = NotificationBus::default();
    let mut rx = bus.subscribe();
    let collection =
        NoteCollection::new(store, session, Arc::new(bus.clone()), config()).unwrap();

    assert!(collection.open(Uuid::new_v4()).await.is_err());
    assert!(collection.notes().is_empty());
    assert!(collection.add_note(Viewport::default()).await.is_err());
    assert!(collection.notes().is_empty());

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].title, "Error fetching notes");
    assert!(notifications[0].description.contains("service unavailable"));
    assert_eq!(notifications[1].title, "Error adding note");
    assert!(notifications.iter().all(|n| n.is_error()));
}
