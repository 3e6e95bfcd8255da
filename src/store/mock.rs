//! In-memory mock implementation of NoteStore for testing without a backend.

use super::traits::NoteStore;
use crate::error::StoreError;
use crate::notes::{Note, Position};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Which store operation a call was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    UpdateContent,
    UpdatePosition,
    UpdateMinimized,
    Delete,
}

/// One recorded call, with exactly the arguments it carried
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List { material_id: Uuid, user_id: Uuid },
    Create { material_id: Uuid, user_id: Uuid, position: Position },
    UpdateContent { id: Uuid, content: String },
    UpdatePosition { id: Uuid, x: f64, y: f64 },
    UpdateMinimized { id: Uuid, is_minimized: bool },
    Delete { id: Uuid },
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            Self::List { .. } => StoreOp::List,
            Self::Create { .. } => StoreOp::Create,
            Self::UpdateContent { .. } => StoreOp::UpdateContent,
            Self::UpdatePosition { .. } => StoreOp::UpdatePosition,
            Self::UpdateMinimized { .. } => StoreOp::UpdateMinimized,
            Self::Delete { .. } => StoreOp::Delete,
        }
    }
}

/// In-memory mock implementation of NoteStore.
///
/// Rows live in a `Vec` behind an async `RwLock`. Every call is recorded
/// before it is served, so failed calls still show up in [`calls`].
/// Operations listed via [`fail_on`] return an `Api` 500 error.
///
/// [`calls`]: MockNoteStore::calls
/// [`fail_on`]: MockNoteStore::fail_on
pub struct MockNoteStore {
    notes: RwLock<Vec<Note>>,
    calls: RwLock<Vec<StoreCall>>,
    failing: RwLock<HashSet<StoreOp>>,
    latency: Option<Duration>,
    list_lag: Option<Duration>,
}

impl MockNoteStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            latency: None,
            list_lag: None,
        }
    }

    /// Pre-seed rows.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RwLock::new(notes),
            ..Self::new()
        }
    }

    /// Delay every call by `latency` (simulates a slow network).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Hold `list` responses for `lag` after the rows are read, so writes
    /// landing meanwhile are missing from the returned snapshot.
    pub fn with_list_lag(mut self, lag: Duration) -> Self {
        self.list_lag = Some(lag);
        self
    }

    /// Make every subsequent call of `op` fail.
    pub async fn fail_on(&self, op: StoreOp) {
        self.failing.write().await.insert(op);
    }

    /// Stop failing `op`.
    pub async fn recover(&self, op: StoreOp) {
        self.failing.write().await.remove(&op);
    }

    /// Snapshot of every call received so far.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().await.clone()
    }

    /// Calls of one kind.
    pub async fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.op() == op)
            .cloned()
            .collect()
    }

    /// Current stored rows.
    pub async fn stored(&self) -> Vec<Note> {
        self.notes.read().await.clone()
    }

    /// Record the call, wait out the latency and apply failure injection.
    async fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        let op = call.op();
        self.calls.write().await.push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.read().await.contains(&op) {
            return Err(StoreError::Api {
                status: 500,
                message: format!("injected {:?} failure", op),
            });
        }
        Ok(())
    }

    async fn modify(&self, id: Uuid, f: impl FnOnce(&mut Note)) -> Result<(), StoreError> {
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.id == id) {
            Some(note) => {
                f(note);
                note.updated_at = Some(chrono::Utc::now());
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }
}

impl Default for MockNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for MockNoteStore {
    async fn list(&self, material_id: Uuid, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        self.enter(StoreCall::List {
            material_id,
            user_id,
        })
        .await?;
        let rows: Vec<Note> = self
            .notes
            .read()
            .await
            .iter()
            .filter(|n| n.material_id == material_id && n.user_id == user_id)
            .cloned()
            .collect();
        if let Some(lag) = self.list_lag {
            tokio::time::sleep(lag).await;
        }
        Ok(rows)
    }

    async fn create(
        &self,
        material_id: Uuid,
        user_id: Uuid,
        position: Position,
    ) -> Result<Note, StoreError> {
        self.enter(StoreCall::Create {
            material_id,
            user_id,
            position,
        })
        .await?;
        let mut note = Note::new(material_id, user_id, position);
        note.created_at = Some(chrono::Utc::now());
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<(), StoreError> {
        self.enter(StoreCall::UpdateContent {
            id,
            content: content.to_string(),
        })
        .await?;
        self.modify(id, |n| n.content = content.to_string()).await
    }

    async fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<(), StoreError> {
        self.enter(StoreCall::UpdatePosition { id, x, y }).await?;
        self.modify(id, |n| n.position = Position::new(x, y)).await
    }

    async fn update_minimized(&self, id: Uuid, is_minimized: bool) -> Result<(), StoreError> {
        self.enter(StoreCall::UpdateMinimized { id, is_minimized })
            .await?;
        self.modify(id, |n| n.is_minimized = is_minimized).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.enter(StoreCall::Delete { id }).await?;
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_list_scoped_by_material_and_user() {
        let store = MockNoteStore::new();
        let (m1, m2, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        store.create(m1, user, Position::new(1.0, 1.0)).await.unwrap();
        store.create(m2, user, Position::new(2.0, 2.0)).await.unwrap();

        let listed = store.list(m1, user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].material_id, m1);
        assert!(store.list(m1, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection_still_records_call() {
        let store = MockNoteStore::new();
        store.fail_on(StoreOp::Delete).await;

        let id = Uuid::new_v4();
        let err = store.delete(id).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 500, .. }));
        assert_eq!(store.calls().await, vec![StoreCall::Delete { id }]);

        store.recover(StoreOp::Delete).await;
        assert!(matches!(
            store.delete(id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_updates_touch_single_field() {
        let store = MockNoteStore::new();
        let note = store
            .create(Uuid::new_v4(), Uuid::new_v4(), Position::new(5.0, 5.0))
            .await
            .unwrap();

        store.update_content(note.id, "hi").await.unwrap();
        store.update_position(note.id, 9.0, 8.0).await.unwrap();
        store.update_minimized(note.id, true).await.unwrap();

        let stored = &store.stored().await[0];
        assert_eq!(stored.content, "hi");
        assert_eq!(stored.position, Position::new(9.0, 8.0));
        assert!(stored.is_minimized);
    }
}
