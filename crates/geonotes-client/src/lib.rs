// ABOUTME: Geonotes client core shared by every front end
// ABOUTME: Provides the HTTP transport, notes REST client, and the observable note store

mod config;
mod error;
mod guard;
mod models;
mod resource;
mod store;
mod transport;

pub use config::{
    ClientConfig, API_URL_ENV, DEFAULT_API_URL, DEFAULT_TIMEOUT_MS, TIMEOUT_ENV,
};
pub use error::{NotesError, Result};
pub use guard::{ActionGuard, ActionTicket};
pub use models::{sort_newest_first, Location, Note, NoteDraft};
pub use resource::{NotesApi, NotesResource, NOTES_PATH};
pub use store::{LoadStatus, NoteStore, NotesView};
pub use transport::Transport;

// Re-exported so callers can pass methods and extra headers to Transport.
pub use reqwest::header::HeaderMap;
pub use reqwest::Method;

/// Build a store backed by the HTTP API described by `config`.
pub fn connect(config: &ClientConfig) -> Result<NoteStore<NotesResource>> {
    let resource = NotesResource::from_config(config)?;
    tracing::debug!(
        api_url = resource.endpoint(),
        timeout_ms = config.timeout_ms,
        "note store configured"
    );
    Ok(NoteStore::new(resource))
}
