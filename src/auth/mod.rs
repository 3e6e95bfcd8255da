//! Session access
//!
//! Sign-in itself happens elsewhere; the note subsystem only needs to know
//! who the current user is and which bearer token to present to the store.

pub mod session;

pub use session::{Session, SessionProvider, StaticSession};
