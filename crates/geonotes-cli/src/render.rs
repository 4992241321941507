// ABOUTME: Plain-text rendering of notes and store state
// ABOUTME: Kept free of terminal colors so output can be asserted in tests

use chrono::{DateTime, Local, Utc};
use geonotes_client::{LoadStatus, Note, NotesView};

const TITLE_WIDTH: usize = 32;

/// Local date and time, minute precision.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn location_text(note: &Note) -> String {
    note.location
        .map(|l| l.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Clip to `max` characters, marking the cut with an ellipsis.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// One line per note for `list`.
pub fn note_row(note: &Note) -> String {
    format!(
        "{:<10} {:<16}  {:<width$}  {}",
        note.id,
        timestamp(&note.created_at),
        clip(&note.title, TITLE_WIDTH),
        location_text(note),
        width = TITLE_WIDTH
    )
}

pub fn note_detail(note: &Note) -> String {
    let description = if note.description.is_empty() {
        "(none)"
    } else {
        note.description.as_str()
    };
    let photo = note.photo_uri.as_deref().unwrap_or("none");

    [
        format!("Title:       {}", note.title),
        format!("Id:          {}", note.id),
        format!("Created:     {}", timestamp(&note.created_at)),
        format!("Location:    {}", location_text(note)),
        format!("Photo:       {}", photo),
        format!("Description: {}", description),
    ]
    .join("\n")
}

/// Summary of a view for `watch`.
pub fn status_line(view: &NotesView) -> String {
    match view.status {
        LoadStatus::Idle => "idle".to_string(),
        LoadStatus::Loading => format!("refreshing ({} notes shown)", view.items.len()),
        LoadStatus::Loaded => format!("{} notes", view.items.len()),
        LoadStatus::Errored => format!(
            "refresh failed: {} ({} stale notes shown)",
            view.error.as_deref().unwrap_or("unknown error"),
            view.items.len()
        ),
    }
}
