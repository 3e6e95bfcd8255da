//! Sticky notes module
//!
//! Notes are free-floating annotations a user pins on top of a study
//! material. Each note belongs to one material and one user; the collection
//! controller keeps them in memory, widgets drive drag/minimize/edit, and
//! every change is written back through a [`crate::store::NoteStore`].

pub mod collection;
pub mod debouncer;
pub mod models;
pub mod widget;

pub use collection::{CollectionConfig, NoteCollection, DEFAULT_SPAWN_FRACTION};
pub use debouncer::{ContentDebouncer, DEFAULT_DEBOUNCE_MS};
pub use models::*;
pub use widget::{Appearance, Cursor, DragState, NoteActions, NoteWidget};
