// ABOUTME: REST client for the notes collection (GET/POST/PUT/DELETE on /notes)
// ABOUTME: NotesApi is the seam the store talks through; NotesResource is the HTTP implementation

use crate::config::ClientConfig;
use crate::error::{NotesError, Result};
use crate::models::{Note, NoteBody, NoteDraft, NoteRecord};
use crate::transport::Transport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

/// Collection path on the server.
pub const NOTES_PATH: &str = "/notes";

/// Characters that cannot appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Note CRUD as the store sees it.
///
/// Implementations propagate every failure; retrying is left to whoever
/// shows the error to a person.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Where the notes live, for error messages.
    fn endpoint(&self) -> &str;

    async fn list(&self) -> Result<Vec<Note>>;

    async fn create(&self, draft: &NoteDraft, created_at: DateTime<Utc>) -> Result<Note>;

    /// Replaces the whole record, so `created_at` must be the note's
    /// existing timestamp.
    async fn update(
        &self,
        id: &str,
        draft: &NoteDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Note>;

    async fn remove(&self, id: &str) -> Result<()>;
}

/// HTTP implementation of [`NotesApi`]
#[derive(Debug, Clone)]
pub struct NotesResource {
    transport: Transport,
}

impl NotesResource {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Transport::new(config)?))
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", NOTES_PATH, utf8_percent_encode(id, SEGMENT))
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        draft: &NoteDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Note> {
        let body = serde_json::to_value(NoteBody { draft, created_at })?;
        let response = self
            .transport
            .request(path, method.clone(), Some(&body), None)
            .await?
            .ok_or_else(|| {
                NotesError::MalformedResponse(format!("{method} {path} returned no note"))
            })?;

        let record: NoteRecord = serde_json::from_value(response)?;
        record.into_written(created_at)
    }
}

#[async_trait]
impl NotesApi for NotesResource {
    fn endpoint(&self) -> &str {
        self.transport.base_url()
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let response = self
            .transport
            .request(NOTES_PATH, Method::GET, None, None)
            .await?;

        let items = match response {
            Some(Value::Array(items)) => items,
            other => {
                warn!(
                    kind = value_kind(other.as_ref()),
                    "list response is not an array, treating as empty"
                );
                return Ok(Vec::new());
            }
        };

        items
            .into_iter()
            .map(|item| serde_json::from_value::<NoteRecord>(item)?.into_listed())
            .collect()
    }

    async fn create(&self, draft: &NoteDraft, created_at: DateTime<Utc>) -> Result<Note> {
        self.write(Method::POST, NOTES_PATH, draft, created_at)
            .await
    }

    async fn update(
        &self,
        id: &str,
        draft: &NoteDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Note> {
        self.write(Method::PUT, &Self::item_path(id), draft, created_at)
            .await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.transport
            .request(&Self::item_path(id), Method::DELETE, None, None)
            .await?;
        Ok(())
    }
}

fn value_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "empty",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
