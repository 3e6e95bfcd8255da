//! Sticky note models
//!
//! A note is a freeform annotation pinned to one course material and owned by
//! one user. Its position is in viewer pixels and is never bounded after
//! creation; `is_minimized` only changes where the note is rendered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use uuid::Uuid;

/// Maximum characters shown for a note in the minimized panel
pub const SUMMARY_MAX_CHARS: usize = 40;

/// Label shown in the minimized panel for a note with no content
pub const EMPTY_NOTE_LABEL: &str = "Empty note";

// ============================================================================
// Geometry
// ============================================================================

/// A point in the viewer's coordinate space (pixels, may be negative)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Visible size of the viewer, used only to pick spawn positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Upper bounds `(max_x, max_y)` of the spawn region for `fraction`
    pub fn spawn_bounds(&self, fraction: f64) -> (f64, f64) {
        (self.width * fraction, self.height * fraction)
    }

    /// Pick a pseudo-random whole-pixel position in the top-left spawn region.
    ///
    /// No overlap avoidance: two notes may land on the same spot.
    pub fn random_spawn(&self, fraction: f64) -> Position {
        let (max_x, max_y) = self.spawn_bounds(fraction);
        Position::new(
            (rand::random::<f64>() * max_x).floor(),
            (rand::random::<f64>() * max_y).floor(),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

// ============================================================================
// Note
// ============================================================================

/// A sticky note attached to a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Assigned by the store on creation
    pub id: Uuid,
    pub material_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub content: String,
    pub position: Position,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// A fresh, empty, restored note as the store would create it
    pub fn new(material_id: Uuid, user_id: Uuid, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            material_id,
            user_id,
            content: String::new(),
            position,
            is_minimized: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Compact label for the minimized panel
    pub fn summary(&self) -> String {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return EMPTY_NOTE_LABEL.to_string();
        }
        let first_line = trimmed.lines().next().unwrap_or(trimmed);
        if first_line.chars().count() > SUMMARY_MAX_CHARS {
            let cut: String = first_line.chars().take(SUMMARY_MAX_CHARS).collect();
            format!("{}…", cut.trim_end())
        } else {
            first_line.to_string()
        }
    }
}
