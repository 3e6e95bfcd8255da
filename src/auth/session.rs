//! Current-user session handed to the note collection and the REST store.

use std::sync::RwLock;
use uuid::Uuid;

/// An authenticated user as seen by the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    /// Bearer token for row-level access; `None` falls back to the anon key
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Source of the current session.
///
/// Returning `None` means "signed out": reads yield no notes and writes
/// abort before reaching the store.
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> Option<Session>;

    fn user_id(&self) -> Option<Uuid> {
        self.current().map(|s| s.user_id)
    }
}

/// Session provider holding a single session that can be replaced at runtime.
#[derive(Debug, Default)]
pub struct StaticSession {
    session: RwLock<Option<Session>>,
}

impl StaticSession {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Replace the current session (sign in / sign out)
    pub fn set(&self, session: Option<Session>) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl SessionProvider for StaticSession {
    fn current(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
