//! Trait abstraction for the remote note store

use crate::error::StoreError;
use crate::notes::{Note, Position};
use async_trait::async_trait;
use uuid::Uuid;

/// Create/read/update/delete of notes against the remote record store.
///
/// Every method is one round trip: no batching, no retries. Failures come
/// back as [`StoreError`] and the caller decides what to tell the user.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of `user_id` attached to `material_id`
    async fn list(&self, material_id: Uuid, user_id: Uuid) -> Result<Vec<Note>, StoreError>;

    /// Insert an empty, restored note at `position` and return it with its id
    async fn create(
        &self,
        material_id: Uuid,
        user_id: Uuid,
        position: Position,
    ) -> Result<Note, StoreError>;

    /// Overwrite the text body only
    async fn update_content(&self, id: Uuid, content: &str) -> Result<(), StoreError>;

    /// Overwrite `position_x` / `position_y` only
    async fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<(), StoreError>;

    /// Overwrite `is_minimized` only
    async fn update_minimized(&self, id: Uuid, is_minimized: bool) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
