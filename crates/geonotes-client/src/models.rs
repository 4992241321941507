// ABOUTME: Data models for geonotes-client
// ABOUTME: Note, NoteDraft, Location, and the tolerant wire record the API returns

use crate::error::{NotesError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GPS coordinate attached to a note.
///
/// Serialized as `{"lat": .., "lng": ..}`; `latitude`/`longitude` are accepted
/// when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and within the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// A note as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "empty_as_none")]
    pub photo_uri: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

/// The user-editable part of a note, submitted to create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    #[serde(with = "empty_as_none")]
    pub photo_uri: Option<String>,
    pub location: Option<Location>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_photo(mut self, photo_uri: impl Into<String>) -> Self {
        self.photo_uri = Some(photo_uri.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Seed an edit form from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            description: note.description.clone(),
            photo_uri: note.photo_uri.clone(),
            location: note.location,
        }
    }

    /// Trimmed copy of the draft, or `Validation` if it cannot be submitted.
    pub fn validated(&self) -> Result<NoteDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(NotesError::Validation("title is required".into()));
        }
        if let Some(loc) = self.location {
            if !loc.is_valid() {
                return Err(NotesError::Validation(format!(
                    "location out of range: {}, {}",
                    loc.latitude, loc.longitude
                )));
            }
        }

        Ok(NoteDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            photo_uri: self
                .photo_uri
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            location: self.location,
        })
    }
}

/// Request body for POST and PUT: the full note minus its id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NoteBody<'a> {
    #[serde(flatten)]
    pub draft: &'a NoteDraft,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

/// Server ids may arrive as strings or as json-server style integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// A note as the server sent it; every field the backend might drop is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NoteRecord {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, with = "empty_as_none")]
    photo_uri: Option<String>,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default, deserialize_with = "iso_millis::deserialize_opt")]
    created_at: Option<DateTime<Utc>>,
}

impl NoteRecord {
    /// Finish a record returned by create or update.
    ///
    /// A missing id gets a generated one; a missing timestamp falls back to
    /// the one the client submitted.
    pub(crate) fn into_written(self, sent_at: DateTime<Utc>) -> Result<Note> {
        let id = match self.id.map(RawId::into_string).filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let generated = uuid::Uuid::new_v4().to_string();
                tracing::warn!(id = %generated, "server returned no id, using client-generated id");
                generated
            }
        };
        let created_at = self.created_at.unwrap_or(sent_at);
        let title = checked_title(&id, self.title)?;

        Ok(Note {
            id,
            title,
            description: self.description,
            photo_uri: self.photo_uri,
            location: self.location,
            created_at,
        })
    }

    /// Finish a record returned by list; both id and timestamp are required.
    pub(crate) fn into_listed(self) -> Result<Note> {
        let id = self
            .id
            .map(RawId::into_string)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| NotesError::MalformedResponse("listed note has no id".into()))?;
        let created_at = self
            .created_at
            .ok_or_else(|| NotesError::MalformedResponse(format!("note {id} has no createdAt")))?;
        let title = checked_title(&id, self.title)?;

        Ok(Note {
            id,
            title,
            description: self.description,
            photo_uri: self.photo_uri,
            location: self.location,
            created_at,
        })
    }
}

/// The store never holds a note without a title.
fn checked_title(id: &str, title: String) -> Result<String> {
    if title.trim().is_empty() {
        return Err(NotesError::MalformedResponse(format!(
            "note {id} has an empty title"
        )));
    }
    Ok(title)
}

/// Stable sort, most recent first. Equal timestamps keep their order.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// `Option<String>` that travels as `""` when absent.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.filter(|s| !s.trim().is_empty()))
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    fn parse<E: Error>(raw: &str) -> Result<DateTime<Utc>, E> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("invalid timestamp {raw:?}: {e}")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) if !raw.trim().is_empty() => parse(&raw).map(Some),
            _ => Ok(None),
        }
    }
}
