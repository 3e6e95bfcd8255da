//! Note store adapter: the only I/O boundary of the note subsystem

pub mod client;
mod impl_note_store;
pub mod records;
pub mod traits;

pub use client::RestNoteStore;
pub use records::{NewNoteRecord, NotePatch, NoteRecord};
pub use traits::NoteStore;

#[cfg(test)]
pub(crate) mod mock;
