//! Transcript - presentation-level record of the conversational enhance flow
//!
//! An ordered, append-only list of entries. The single allowed mutation is
//! replacing a `Processing` placeholder with its terminal content, looked up
//! by entry id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Image reference inside a transcript entry (base64 or URL).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageRef {
    Base64 { data: String, media_type: String },
    Url { url: String },
}

/// The content of a transcript entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryBody {
    Text {
        text: String,
    },

    Image {
        source: ImageRef,
        alt_text: Option<String>,
    },

    /// A finished enhancement with its result image and metadata.
    Enhancement {
        source: ImageRef,
        original_filename: String,
        processing_time: f64,
        enhancements_applied: Vec<String>,
    },

    /// Placeholder shown while a job is in flight; resolved in place.
    Processing {
        label: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub role: Role,
    pub body: EntryBody,
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(role: Role, body: EntryBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            body,
            created_at: Utc::now(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.body, EntryBody::Processing { .. })
    }
}

/// Append-only entry list. Entries are never removed or reordered.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning its id.
    pub fn push(&mut self, role: Role, body: EntryBody) -> Uuid {
        let entry = TranscriptEntry::new(role, body);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Append the assistant-side "working on it" placeholder.
    pub fn push_placeholder(&mut self, label: impl Into<String>) -> Uuid {
        self.push(
            Role::Assistant,
            EntryBody::Processing {
                label: label.into(),
            },
        )
    }

    /// Replace the placeholder with the given id by its terminal content.
    /// Returns false if the id is unknown or the entry is not a placeholder;
    /// resolved entries stay resolved.
    pub fn resolve_placeholder(&mut self, id: Uuid, body: EntryBody) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) if entry.is_placeholder() => {
                entry.body = body;
                true
            }
            _ => false,
        }
    }
}
