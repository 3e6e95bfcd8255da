//! Draggable sticky note widget
//!
//! Each rendered note owns a small state machine:
//!
//! ```text
//!   Idle --pointer_down--> Dragging{offset} --pointer_move--> Dragging
//!     ^                                         |
//!     +----------------pointer_up---------------+   (one position write)
//! ```
//!
//! plus an orthogonal restored/minimized flag. The widget only keeps the
//! drag offset and the dragging flag to itself; everything that must survive
//! goes out through [`NoteActions`].

use super::models::{Note, Position};
use std::sync::Arc;
use uuid::Uuid;

/// z-index of a note while it is being dragged
pub const DRAGGING_Z_INDEX: u32 = 1000;
/// z-index of a resting note
pub const RESTING_Z_INDEX: u32 = 1;

/// What a widget can ask its owner to do
pub trait NoteActions {
    /// Drag finished at `position`
    fn on_position_change(&self, id: Uuid, position: Position);
    fn on_minimize(&self, id: Uuid, is_minimized: bool);
    /// Called on every keystroke; the owner decides when to persist
    fn on_content_change(&self, id: Uuid, content: &str);
    fn on_delete(&self, id: Uuid);
}

impl<T: NoteActions + ?Sized> NoteActions for Arc<T> {
    fn on_position_change(&self, id: Uuid, position: Position) {
        (**self).on_position_change(id, position)
    }

    fn on_minimize(&self, id: Uuid, is_minimized: bool) {
        (**self).on_minimize(id, is_minimized)
    }

    fn on_content_change(&self, id: Uuid, content: &str) {
        (**self).on_content_change(id, content)
    }

    fn on_delete(&self, id: Uuid) {
        (**self).on_delete(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `offset` is pointer minus note origin at pointer-down
    Dragging { offset: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Grab,
    Grabbing,
}

/// How the note should be drawn right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub z_index: u32,
    pub cursor: Cursor,
    /// Render as a small tile in the minimized panel
    pub compact: bool,
}

/// Interactive state of one note on screen
pub struct NoteWidget<A: NoteActions> {
    id: Uuid,
    content: String,
    position: Position,
    is_minimized: bool,
    drag: DragState,
    deleted: bool,
    actions: A,
}

impl<A: NoteActions> NoteWidget<A> {
    pub fn new(note: &Note, actions: A) -> Self {
        Self {
            id: note.id,
            content: note.content.clone(),
            position: note.position,
            is_minimized: note.is_minimized,
            drag: DragState::Idle,
            deleted: false,
            actions,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    // ========================================================================
    // Drag
    // ========================================================================

    /// Pointer pressed on the drag handle. Returns whether a drag started.
    pub fn pointer_down(&mut self, pointer: Position) -> bool {
        if self.deleted || self.is_minimized || self.is_dragging() {
            return false;
        }
        self.drag = DragState::Dragging {
            offset: pointer - self.position,
        };
        true
    }

    /// Pointer moved anywhere in the window. Only local state changes.
    pub fn pointer_move(&mut self, pointer: Position) {
        if let DragState::Dragging { offset } = self.drag {
            self.position = pointer - offset;
        }
    }

    /// Pointer released. Ends the drag and reports the final position once.
    pub fn pointer_up(&mut self) -> Option<Position> {
        if !self.is_dragging() {
            return None;
        }
        self.drag = DragState::Idle;
        self.actions.on_position_change(self.id, self.position);
        Some(self.position)
    }

    // ========================================================================
    // Minimize / restore
    // ========================================================================

    pub fn toggle_minimized(&mut self) {
        self.set_minimized(!self.is_minimized);
    }

    pub fn minimize(&mut self) {
        self.set_minimized(true);
    }

    pub fn restore(&mut self) {
        self.set_minimized(false);
    }

    fn set_minimized(&mut self, is_minimized: bool) {
        if self.deleted || self.is_minimized == is_minimized {
            return;
        }
        // A drag in progress is abandoned without a position write
        self.drag = DragState::Idle;
        self.is_minimized = is_minimized;
        self.actions.on_minimize(self.id, is_minimized);
    }

    // ========================================================================
    // Content / delete
    // ========================================================================

    /// Text changed in the editor
    pub fn edit(&mut self, content: impl Into<String>) {
        if self.deleted {
            return;
        }
        self.content = content.into();
        self.actions.on_content_change(self.id, &self.content);
    }

    /// Delete button, available restored or minimized
    pub fn delete(&mut self) {
        if self.deleted {
            return;
        }
        self.deleted = true;
        self.drag = DragState::Idle;
        self.actions.on_delete(self.id);
    }

    pub fn appearance(&self) -> Appearance {
        let dragging = self.is_dragging();
        Appearance {
            z_index: if dragging { DRAGGING_Z_INDEX } else { RESTING_Z_INDEX },
            cursor: if dragging { Cursor::Grabbing } else { Cursor::Grab },
            compact: self.is_minimized,
        }
    }
}
