//! Row shapes of the `material_notes` table as they travel over the wire

use crate::error::StoreError;
use crate::notes::{Note, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table holding sticky notes
pub const NOTES_TABLE: &str = "material_notes";

/// A `material_notes` row as returned by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    #[serde(default)]
    pub material_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub position_x: f64,
    #[serde(default)]
    pub position_y: f64,
    /// Nullable column; `null` reads as restored
    #[serde(default)]
    pub is_minimized: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl NoteRecord {
    /// Convert into a domain note.
    ///
    /// The foreign keys are nullable in the table; the ids the caller queried
    /// or inserted with fill the gaps.
    pub fn into_note(self, material_id: Uuid, user_id: Uuid) -> Note {
        Note {
            id: self.id,
            material_id: self.material_id.unwrap_or(material_id),
            user_id: self.user_id.unwrap_or(user_id),
            content: self.content,
            position: Position::new(self.position_x, self.position_y),
            is_minimized: self.is_minimized.unwrap_or(false),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Insert payload for a new note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNoteRecord {
    pub material_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub position_x: f64,
    pub position_y: f64,
    pub is_minimized: bool,
}

impl NewNoteRecord {
    pub fn new(material_id: Uuid, user_id: Uuid, position: Position) -> Self {
        Self {
            material_id,
            user_id,
            content: String::new(),
            position_x: position.x,
            position_y: position.y,
            is_minimized: false,
        }
    }
}

/// Partial update: only the fields that changed are serialized
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_minimized: Option<bool>,
}

impl NotePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position_x: Some(x),
            position_y: Some(y),
            ..Default::default()
        }
    }

    pub fn minimized(is_minimized: bool) -> Self {
        Self {
            is_minimized: Some(is_minimized),
            ..Default::default()
        }
    }
}

/// Take the single row out of a `return=representation` response
pub(crate) fn single_row(rows: Vec<NoteRecord>) -> Result<NoteRecord, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode("store returned no row".into()))
}
