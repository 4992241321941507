// ABOUTME: NoteStore - the single client-side source of truth for notes
// ABOUTME: Reconciles server responses into an ordered collection and broadcasts each transition

use crate::error::Result;
use crate::models::{sort_newest_first, Note, NoteDraft};
use crate::resource::NotesApi;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where the collection is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Read-only snapshot handed to presentation code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotesView {
    pub items: Vec<Note>,
    pub status: LoadStatus,
    /// Message from the last failed refresh; cleared when a refresh starts.
    pub error: Option<String>,
}

impl NotesView {
    pub fn loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.items.iter().find(|n| n.id == id)
    }
}

struct Inner<A> {
    api: A,
    state: watch::Sender<NotesView>,
}

/// Owns the note collection and mediates every read and write to the API.
///
/// Cloning is cheap and every clone shares the same state, so the handle is
/// passed to each collaborator that needs it. State lives in a watch channel:
/// [`NoteStore::subscribe`] observes every transition, [`NoteStore::view`]
/// takes a snapshot.
///
/// Writes are applied only after the server confirms them. Overlapping
/// refreshes are not fenced; whichever response lands last wins. Callers
/// serialize writes to the same id (see [`crate::ActionGuard`]).
pub struct NoteStore<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for NoteStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: NotesApi> NoteStore<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(NotesView::default());
        Self {
            inner: Arc::new(Inner { api, state }),
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Current snapshot.
    pub fn view(&self) -> NotesView {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<NotesView> {
        self.inner.state.subscribe()
    }

    /// In-memory lookup; never touches the network.
    pub fn get_by_id(&self, id: &str) -> Option<Note> {
        self.inner.state.borrow().get(id).cloned()
    }

    /// Reload the whole collection.
    ///
    /// Failures are recorded in the view (`Errored` plus a message) rather
    /// than returned; the previous items stay visible.
    pub async fn refresh(&self) {
        self.inner.state.send_modify(|s| {
            s.status = LoadStatus::Loading;
            s.error = None;
        });

        match self.inner.api.list().await {
            Ok(notes) => {
                let mut notes = dedupe_by_id(notes);
                sort_newest_first(&mut notes);
                info!(count = notes.len(), "notes refreshed");
                self.inner.state.send_modify(|s| {
                    s.items = notes;
                    s.status = LoadStatus::Loaded;
                    s.error = None;
                });
            }
            Err(err) => {
                warn!(error = %err, "refresh failed, keeping previous notes");
                let message = err.user_message(self.inner.api.endpoint());
                self.inner.state.send_modify(|s| {
                    s.status = LoadStatus::Errored;
                    s.error = Some(message);
                });
            }
        }
    }

    /// Create a note. It lands at the front of the collection once the
    /// server has assigned its id.
    pub async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let draft = draft.validated()?;
        let created = self.inner.api.create(&draft, Utc::now()).await?;
        info!(id = %created.id, "note created");
        Ok(self.upsert(created))
    }

    /// Replace a note's editable fields. The note's `created_at` is resent
    /// unchanged; the entry keeps its position.
    ///
    /// For an id the store has not loaded, the timestamp is read from the
    /// server's list first. An id the server does not list either is still
    /// sent, stamped with the current time, and the server decides.
    pub async fn update(&self, id: &str, draft: &NoteDraft) -> Result<Note> {
        let draft = draft.validated()?;
        let created_at = match self.get_by_id(id) {
            Some(note) => note.created_at,
            None => self.server_created_at(id).await?,
        };
        let updated = self.inner.api.update(id, &draft, created_at).await?;
        info!(id = %updated.id, "note updated");
        Ok(self.upsert(updated))
    }

    /// Delete a note. Removing an id the store does not hold is a no-op
    /// locally once the server agrees.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.inner.api.remove(id).await?;
        self.inner.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|n| n.id != id);
            s.items.len() != before
        });
        info!(id, "note deleted");
        Ok(())
    }

    async fn server_created_at(&self, id: &str) -> Result<DateTime<Utc>> {
        let listed = self.inner.api.list().await?;
        match listed.into_iter().find(|n| n.id == id) {
            Some(note) => Ok(note.created_at),
            None => {
                debug!(id, "note not listed by the server, stamping now");
                Ok(Utc::now())
            }
        }
    }

    /// Insert or replace by id and return what the store now holds.
    fn upsert(&self, note: Note) -> Note {
        let mut stored = note.clone();
        self.inner.state.send_modify(|s| {
            stored = upsert_note(&mut s.items, note);
        });
        stored
    }
}

/// Collapse repeated ids. The later record wins and takes the slot of the
/// first occurrence.
fn dedupe_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(notes.len());
    let mut unique: Vec<Note> = Vec::with_capacity(notes.len());
    for note in notes {
        match slots.get(&note.id) {
            Some(&slot) => {
                warn!(id = %note.id, "server listed the same id twice, keeping the later record");
                unique[slot] = note;
            }
            None => {
                slots.insert(note.id.clone(), unique.len());
                unique.push(note);
            }
        }
    }
    unique
}

/// Replace the entry with the same id in place, or insert at the front.
///
/// A replaced entry keeps its original `created_at`.
fn upsert_note(items: &mut Vec<Note>, mut note: Note) -> Note {
    match items.iter_mut().find(|n| n.id == note.id) {
        Some(existing) => {
            if existing.created_at != note.created_at {
                warn!(
                    id = %note.id,
                    "server changed createdAt, keeping the original"
                );
                note.created_at = existing.created_at;
            }
            *existing = note.clone();
        }
        None => items.insert(0, note.clone()),
    }
    note
}
