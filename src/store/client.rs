//! REST client for the managed backend's `material_notes` table
//!
//! Speaks the PostgREST dialect exposed at `{url}/rest/v1/`: filters are
//! `column=eq.value` query parameters, inserts and updates ask for the
//! affected rows back with `Prefer: return=representation`.

use super::records::{single_row, NewNoteRecord, NotePatch, NoteRecord, NOTES_TABLE};
use crate::auth::SessionProvider;
use crate::error::StoreError;
use crate::notes::{Note, Position};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for note CRUD against the record store
pub struct RestNoteStore {
    http: Client,
    base_url: String,
    anon_key: String,
    session: Arc<dyn SessionProvider>,
}

impl RestNoteStore {
    /// Create a new client.
    ///
    /// `anon_key` is the project's public API key; the signed-in user's access
    /// token, when the session has one, is sent as the bearer instead.
    pub fn new(
        base_url: &str,
        anon_key: &str,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, NOTES_TABLE)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let bearer = self
            .session
            .current()
            .and_then(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());

        self.http
            .request(method, self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Turn a non-2xx response into [`StoreError::Api`], or
    /// [`StoreError::Unauthenticated`] for a rejected bearer
    async fn check(resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthenticated);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// PATCH one row by id with only the fields present in `patch`
    async fn patch(&self, id: Uuid, patch: &NotePatch) -> Result<(), StoreError> {
        let resp = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        let rows: Vec<NoteRecord> = Self::decode(Self::check(resp).await?).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// List one user's notes for a material
    pub async fn list(&self, material_id: Uuid, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let resp = self
            .request(Method::GET)
            .query(&[
                ("select", "*".to_string()),
                ("material_id", format!("eq.{}", material_id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await?;

        let rows: Vec<NoteRecord> = Self::decode(Self::check(resp).await?).await?;
        tracing::debug!(
            material_id = %material_id,
            count = rows.len(),
            "Fetched notes"
        );
        Ok(rows
            .into_iter()
            .map(|r| r.into_note(material_id, user_id))
            .collect())
    }

    /// Insert a new empty note
    pub async fn create(
        &self,
        material_id: Uuid,
        user_id: Uuid,
        position: Position,
    ) -> Result<Note, StoreError> {
        let record = NewNoteRecord::new(material_id, user_id, position);
        let resp = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        let rows: Vec<NoteRecord> = Self::decode(Self::check(resp).await?).await?;
        let note = single_row(rows)?.into_note(material_id, user_id);
        tracing::debug!(note_id = %note.id, material_id = %material_id, "Created note");
        Ok(note)
    }

    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<(), StoreError> {
        self.patch(id, &NotePatch::content(content)).await
    }

    pub async fn update_position(&self, id: Uuid, x: f64, y: f64) -> Result<(), StoreError> {
        self.patch(id, &NotePatch::position(x, y)).await
    }

    pub async fn update_minimized(&self, id: Uuid, is_minimized: bool) -> Result<(), StoreError> {
        self.patch(id, &NotePatch::minimized(is_minimized)).await
    }

    /// Delete a note by id
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let resp = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::debug!(note_id = %id, "Deleted note");
        Ok(())
    }
}
