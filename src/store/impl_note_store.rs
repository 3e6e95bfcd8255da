//! NoteStore trait implementation for RestNoteStore
//!
//! Each trait method delegates directly to the corresponding inherent method
//! on `RestNoteStore`.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::RestNoteStore;
use super::traits::NoteStore;
use crate::error::StoreError;
use crate::notes::{Note, Position};

#[async_trait]
impl NoteStore for RestNoteStore {
    async fn list(&self, material_id: Uuid, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        self.list(material_id, user_id).await
    }

    async fn create(
        &self,
        material_id: Uuid,
        user_id: Uuid,
        position: Position,
    ) -> Result<Note, StoreError> {
        self.create(material_id, user_id, position).await
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<(), StoreError> {
        self.update_content(id, content).await
    }

    async fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<(), StoreError> {
        self.update_position(id, x, y).await
    }

    async fn update_minimized(&self, id: Uuid, is_minimized: bool) -> Result<(), StoreError> {
        self.update_minimized(id, is_minimized).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete(id).await
    }
}
