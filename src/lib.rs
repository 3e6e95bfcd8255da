//! Study Notes
//!
//! Sticky notes pinned on top of study materials:
//! - Note collection controller with optimistic local updates
//! - Draggable, minimizable note widgets
//! - Debounced persistence of note text
//! - PostgREST-style record store adapter

pub mod auth;
pub mod error;
pub mod events;
pub mod notes;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::{Session, StaticSession};
use crate::events::NotificationBus;
use crate::notes::{CollectionConfig, NoteCollection, Viewport};
use crate::store::{NoteStore, RestNoteStore};

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "study-notes.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub backend: BackendYamlConfig,
    pub session: SessionYamlConfig,
    pub notes: NotesYamlConfig,
}

/// Record store endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendYamlConfig {
    pub url: String,
    pub anon_key: String,
}

impl Default for BackendYamlConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".into(),
            anon_key: String::new(),
        }
    }
}

/// Signed-in user. Absent `user_id` means signed out.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionYamlConfig {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

/// Note behaviour tunables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotesYamlConfig {
    pub debounce_ms: u64,
    pub spawn_fraction: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for NotesYamlConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            debounce_ms: notes::DEFAULT_DEBOUNCE_MS,
            spawn_fraction: notes::DEFAULT_SPAWN_FRACTION,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub anon_key: String,
    pub user_id: Option<Uuid>,
    pub access_token: Option<String>,
    pub debounce_ms: u64,
    pub spawn_fraction: f64,
    pub viewport: Viewport,
}

impl Config {
    /// Equivalent to `from_yaml_and_env(None)`.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries `study-notes.yaml` in CWD. A missing file
    /// falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let user_id = std::env::var("STUDY_NOTES_USER_ID")
            .ok()
            .or(yaml.session.user_id)
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                Uuid::parse_str(s.trim()).with_context(|| format!("Invalid user id '{}'", s))
            })
            .transpose()?;

        let access_token = std::env::var("STUDY_NOTES_ACCESS_TOKEN")
            .ok()
            .or(yaml.session.access_token)
            .filter(|s| !s.is_empty());

        let config = Self {
            backend_url: std::env::var("STUDY_NOTES_BACKEND_URL").unwrap_or(yaml.backend.url),
            anon_key: std::env::var("STUDY_NOTES_ANON_KEY").unwrap_or(yaml.backend.anon_key),
            user_id,
            access_token,
            debounce_ms: std::env::var("STUDY_NOTES_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.notes.debounce_ms),
            spawn_fraction: std::env::var("STUDY_NOTES_SPAWN_FRACTION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.notes.spawn_fraction),
            viewport: Viewport::new(yaml.notes.viewport_width, yaml.notes.viewport_height),
        };

        config
            .collection_config()
            .validate()
            .context("Invalid notes configuration")?;
        Ok(config)
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn collection_config(&self) -> CollectionConfig {
        CollectionConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            spawn_fraction: self.spawn_fraction,
        }
    }

    /// Initial session, if a user is configured
    pub fn session(&self) -> Option<Session> {
        self.user_id.map(|user_id| {
            let session = Session::new(user_id);
            match &self.access_token {
                Some(token) => session.with_access_token(token.clone()),
                None => session,
            }
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NoteStore>,
    pub session: Arc<StaticSession>,
    pub bus: NotificationBus,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with all services initialized
    pub fn new(config: Config) -> Result<Self> {
        let session = Arc::new(StaticSession::new(config.session()));
        let store = Arc::new(
            RestNoteStore::new(&config.backend_url, &config.anon_key, session.clone())
                .context("Failed to build record store client")?,
        );

        Ok(Self {
            store,
            session,
            bus: NotificationBus::default(),
            config: Arc::new(config),
        })
    }

    /// A fresh collection controller over the shared store, session and bus
    pub fn collection(&self) -> Result<NoteCollection> {
        Ok(NoteCollection::new(
            self.store.clone(),
            self.session.clone(),
            Arc::new(self.bus.clone()),
            self.config.collection_config(),
        )?)
    }
}

// ============================================================================
// Tests
// ============================================================================
