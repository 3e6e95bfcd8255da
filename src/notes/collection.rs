//! Note collection controller
//!
//! Owns the authoritative in-memory list of notes for the material that is
//! currently open. Every mutation is applied locally first and then written
//! to the store in the background; a failed write is reported through the
//! notification sink and the local state is kept as-is.
//!
//! Must be used from within a tokio runtime: background writes are spawned.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use super::debouncer::{ContentDebouncer, DEFAULT_DEBOUNCE_MS};
use super::models::{Note, Position, Viewport};
use super::widget::{NoteActions, NoteWidget};
use crate::auth::SessionProvider;
use crate::error::{NoteError, Result};
use crate::events::NotificationSink;
use crate::store::NoteStore;

/// Fraction of the viewport used as the spawn region for new notes
pub const DEFAULT_SPAWN_FRACTION: f64 = 0.4;

/// Tunables for a [`NoteCollection`]
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Quiet period before a content edit is written
    pub debounce: Duration,
    /// New notes spawn in `[0, width*f] x [0, height*f]`
    pub spawn_fraction: f64,
}

impl CollectionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.spawn_fraction > 0.0 && self.spawn_fraction <= 1.0) {
            return Err(NoteError::InvalidConfig(format!(
                "spawn_fraction must be in (0, 1], got {}",
                self.spawn_fraction
            )));
        }
        Ok(())
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            spawn_fraction: DEFAULT_SPAWN_FRACTION,
        }
    }
}

#[derive(Default)]
struct CollectionState {
    material_id: Option<Uuid>,
    /// Bumped on every open/close; async results from an older value are stale
    generation: u64,
    notes: Vec<Note>,
    debouncers: HashMap<Uuid, ContentDebouncer>,
    /// Outstanding fetch/create calls for the current generation
    loading: usize,
}

impl CollectionState {
    /// Forget the open material. Pending content edits are flushed, not lost.
    fn reset(&mut self) {
        for debouncer in self.debouncers.values() {
            debouncer.flush();
        }
        self.debouncers.clear();
        self.notes.clear();
        self.material_id = None;
        self.loading = 0;
        self.generation += 1;
    }

    fn finish_loading(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.loading = self.loading.saturating_sub(1);
        true
    }

    fn note_mut(&mut self, id: Uuid) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }
}

struct Inner {
    store: Arc<dyn NoteStore>,
    session: Arc<dyn SessionProvider>,
    notifier: Arc<dyn NotificationSink>,
    config: CollectionConfig,
    state: Mutex<CollectionState>,
    tracker: TaskTracker,
    /// Serializes `settle` callers around the tracker's close/reopen
    settle_lock: tokio::sync::Mutex<()>,
}

/// Controller for the notes of one open material.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct NoteCollection {
    inner: Arc<Inner>,
}

impl NoteCollection {
    pub fn new(
        store: Arc<dyn NoteStore>,
        session: Arc<dyn SessionProvider>,
        notifier: Arc<dyn NotificationSink>,
        config: CollectionConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                store,
                session,
                notifier,
                config,
                state: Mutex::new(CollectionState::default()),
                tracker: TaskTracker::new(),
                settle_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, CollectionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current user, or notify and fail when signed out
    fn require_user(&self, title: &str, note_id: Option<Uuid>) -> Result<Uuid> {
        match self.inner.session.user_id() {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::debug!(action = title, "Write aborted: no session");
                self.inner
                    .notifier
                    .notify_error(title, "User not authenticated", note_id);
                Err(NoteError::Unauthenticated)
            }
        }
    }

    // ========================================================================
    // Open / close
    // ========================================================================

    /// Open `material_id` and fetch its notes.
    ///
    /// Any previously open material is closed first. Without a session the
    /// collection simply stays empty. Returns the number of notes loaded.
    pub async fn open(&self, material_id: Uuid) -> Result<usize> {
        let generation = {
            let mut state = self.state();
            state.reset();
            state.material_id = Some(material_id);
            state.generation
        };

        let Some(user_id) = self.inner.session.user_id() else {
            tracing::debug!(material_id = %material_id, "No session, showing no notes");
            return Ok(0);
        };

        self.state().loading += 1;
        let result = self.inner.store.list(material_id, user_id).await;

        let mut state = self.state();
        if !state.finish_loading(generation) {
            tracing::debug!(material_id = %material_id, "Ignoring notes fetched for a closed view");
            return Err(NoteError::Closed);
        }

        match result {
            Ok(fetched) => {
                let count = fetched.len();
                // Notes created while the fetch was in flight may be missing
                // from its snapshot
                let added: Vec<Note> = std::mem::take(&mut state.notes)
                    .into_iter()
                    .filter(|n| !fetched.iter().any(|f| f.id == n.id))
                    .collect();
                state.notes = fetched;
                if !added.is_empty() {
                    tracing::debug!(material_id = %material_id, kept = added.len(), "Keeping notes added during load");
                    state.notes.extend(added);
                }
                tracing::debug!(material_id = %material_id, count, "Notes loaded");
                Ok(count)
            }
            Err(e) => {
                drop(state);
                tracing::warn!(material_id = %material_id, error = %e, "Failed to fetch notes");
                self.inner
                    .notifier
                    .notify_error("Error fetching notes", &e.to_string(), None);
                Err(e.into())
            }
        }
    }

    /// Close the view: discard all local state.
    ///
    /// Pending content edits are flushed in the background; results of
    /// fetches or creates still in flight are ignored when they arrive.
    pub fn close(&self) {
        let mut state = self.state();
        if let Some(material_id) = state.material_id {
            tracing::debug!(material_id = %material_id, "Closing notes view");
        }
        state.reset();
    }

    /// Wait until every background write issued so far has completed,
    /// including debounced edits that have not fired yet.
    ///
    /// Safe to call from several tasks at once; callers take turns.
    pub async fn settle(&self) {
        let _guard = self.inner.settle_lock.lock().await;
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        self.inner.tracker.reopen();
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a note at a random spot in the top-left part of `viewport`.
    ///
    /// The note is appended only once the store has assigned its id.
    pub async fn add_note(&self, viewport: Viewport) -> Result<Note> {
        let (material_id, generation) = {
            let state = self.state();
            match state.material_id {
                Some(m) => (m, state.generation),
                None => return Err(NoteError::Closed),
            }
        };
        let user_id = self.require_user("Error adding note", None)?;

        let position = viewport.random_spawn(self.inner.config.spawn_fraction);
        self.state().loading += 1;
        let result = self.inner.store.create(material_id, user_id, position).await;

        let mut state = self.state();
        let current = state.finish_loading(generation);

        match result {
            Ok(note) => {
                if !current {
                    tracing::debug!(note_id = %note.id, "Note created for a closed view, not shown");
                    return Err(NoteError::Closed);
                }
                state.notes.push(note.clone());
                drop(state);
                tracing::debug!(note_id = %note.id, x = position.x, y = position.y, "Note added");
                self.inner
                    .notifier
                    .notify_success("Note added successfully", Some(note.id));
                Ok(note)
            }
            Err(e) => {
                drop(state);
                tracing::warn!(material_id = %material_id, error = %e, "Failed to add note");
                self.inner
                    .notifier
                    .notify_error("Error adding note", &e.to_string(), None);
                Err(e.into())
            }
        }
    }

    /// Remove a note locally right away, then delete it remotely.
    ///
    /// A pending content edit for the note is discarded. Returns whether the
    /// note was present.
    pub fn delete_note(&self, id: Uuid) -> Result<bool> {
        self.require_user("Error deleting note", Some(id))?;

        {
            let mut state = self.state();
            let before = state.notes.len();
            state.notes.retain(|n| n.id != id);
            if state.notes.len() == before {
                tracing::debug!(note_id = %id, "Delete of unknown note ignored");
                return Ok(false);
            }
            if let Some(debouncer) = state.debouncers.remove(&id) {
                debouncer.cancel();
            }
        }

        let store = self.inner.store.clone();
        let notifier = self.inner.notifier.clone();
        self.inner.tracker.spawn(async move {
            match store.delete(id).await {
                Ok(()) => notifier.notify_success("Note deleted successfully", Some(id)),
                Err(e) => {
                    tracing::warn!(note_id = %id, error = %e, "Failed to delete note");
                    notifier.notify_error("Error deleting note", &e.to_string(), Some(id));
                }
            }
        });
        Ok(true)
    }

    /// Move a note locally, then persist only its coordinates.
    pub fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<bool> {
        self.require_user("Error updating note position", Some(id))?;

        match self.state().note_mut(id) {
            Some(note) => note.position = Position::new(x, y),
            None => {
                tracing::debug!(note_id = %id, "Position update for unknown note ignored");
                return Ok(false);
            }
        }

        let store = self.inner.store.clone();
        let notifier = self.inner.notifier.clone();
        self.inner.tracker.spawn(async move {
            if let Err(e) = store.update_position(id, x, y).await {
                tracing::warn!(note_id = %id, error = %e, "Failed to save note position");
                notifier.notify_error("Error updating note position", &e.to_string(), Some(id));
            }
        });
        Ok(true)
    }

    /// Minimize or restore a note locally, then persist only that flag.
    pub fn set_minimized(&self, id: Uuid, is_minimized: bool) -> Result<bool> {
        self.require_user("Error updating note", Some(id))?;

        match self.state().note_mut(id) {
            Some(note) => note.is_minimized = is_minimized,
            None => {
                tracing::debug!(note_id = %id, "Minimize of unknown note ignored");
                return Ok(false);
            }
        }

        let store = self.inner.store.clone();
        let notifier = self.inner.notifier.clone();
        self.inner.tracker.spawn(async move {
            if let Err(e) = store.update_minimized(id, is_minimized).await {
                tracing::warn!(note_id = %id, error = %e, "Failed to save minimized state");
                notifier.notify_error("Error updating note", &e.to_string(), Some(id));
            }
        });
        Ok(true)
    }

    /// Replace a note's text locally; the write is debounced.
    pub fn update_content(&self, id: Uuid, content: &str) -> Result<bool> {
        self.require_user("Error saving note", Some(id))?;

        let mut state = self.state();
        match state.note_mut(id) {
            Some(note) => note.content = content.to_string(),
            None => {
                tracing::debug!(note_id = %id, "Edit of unknown note ignored");
                return Ok(false);
            }
        }

        let inner = &self.inner;
        state
            .debouncers
            .entry(id)
            .or_insert_with(|| {
                ContentDebouncer::with_tracker(
                    id,
                    inner.store.clone(),
                    inner.notifier.clone(),
                    inner.config.debounce,
                    inner.tracker.clone(),
                )
            })
            .edit(content);
        Ok(true)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn material_id(&self) -> Option<Uuid> {
        self.state().material_id
    }

    pub fn is_open(&self) -> bool {
        self.material_id().is_some()
    }

    /// Whether a fetch or create for the open material is outstanding
    pub fn is_loading(&self) -> bool {
        self.state().loading > 0
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state().notes.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Note> {
        self.state().notes.iter().find(|n| n.id == id).cloned()
    }

    /// Notes drawn on top of the document
    pub fn visible(&self) -> Vec<Note> {
        self.state()
            .notes
            .iter()
            .filter(|n| !n.is_minimized)
            .cloned()
            .collect()
    }

    /// Notes shown in the minimized panel
    pub fn minimized(&self) -> Vec<Note> {
        self.state()
            .notes
            .iter()
            .filter(|n| n.is_minimized)
            .cloned()
            .collect()
    }

    /// `(id, label)` rows for the minimized panel
    pub fn minimized_summaries(&self) -> Vec<(Uuid, String)> {
        self.minimized()
            .into_iter()
            .map(|n| (n.id, n.summary()))
            .collect()
    }

    /// One widget per visible note, wired back to this collection
    pub fn visible_widgets(&self) -> Vec<NoteWidget<NoteCollection>> {
        self.visible()
            .iter()
            .map(|n| NoteWidget::new(n, self.clone()))
            .collect()
    }

    /// Widget for any note, minimized or not
    pub fn widget(&self, id: Uuid) -> Option<NoteWidget<NoteCollection>> {
        self.get(id).map(|n| NoteWidget::new(&n, self.clone()))
    }
}

impl NoteActions for NoteCollection {
    // Failures are already surfaced as notifications; widgets have no
    // caller to hand them to.
    fn on_position_change(&self, id: Uuid, position: Position) {
        if let Err(e) = self.update_position(id, position.x, position.y) {
            tracing::debug!(note_id = %id, error = %e, "Position change rejected");
        }
    }

    fn on_minimize(&self, id: Uuid, is_minimized: bool) {
        if let Err(e) = self.set_minimized(id, is_minimized) {
            tracing::debug!(note_id = %id, error = %e, "Minimize rejected");
        }
    }

    fn on_content_change(&self, id: Uuid, content: &str) {
        if let Err(e) = self.update_content(id, content) {
            tracing::debug!(note_id = %id, error = %e, "Edit rejected");
        }
    }

    fn on_delete(&self, id: Uuid) {
        if let Err(e) = self.delete_note(id) {
            tracing::debug!(note_id = %id, error = %e, "Delete rejected");
        }
    }
}
