use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Envelope format written by this version
pub const DRAFT_FORMAT_VERSION: u32 = 1;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_AUTHOR_CHARS: usize = 200;
pub const MAX_TOPIC_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// A form's field values that can be saved as a draft
pub trait DraftPayload: Serialize + DeserializeOwned + Clone + PartialEq + Send + 'static {
    /// Short name used in storage keys, e.g. `writing`
    const KIND: &'static str;

    /// Whether at least one field holds something worth recovering
    fn has_content(&self) -> bool;

    /// Check field limits after reading a stored value
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A saved snapshot of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft<T> {
    pub version: u32,
    pub storage_key: String,
    pub saved_at: DateTime<Utc>,
    pub payload: T,
}

impl<T: DraftPayload> Draft<T> {
    pub fn new(storage_key: impl Into<String>, payload: T, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: DRAFT_FORMAT_VERSION,
            storage_key: storage_key.into(),
            saved_at,
            payload,
        }
    }

    /// Check that a stored envelope belongs under `key` and is well formed
    pub fn validate_for(&self, key: &str) -> Result<(), String> {
        if self.version != DRAFT_FORMAT_VERSION {
            return Err(format!("unsupported draft version {}", self.version));
        }
        if self.storage_key != key {
            return Err(format!("draft belongs to {}", self.storage_key));
        }
        self.payload.validate()
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max {
        return Err(format!("{} has {} characters, limit is {}", field, len, max));
    }
    Ok(())
}

/// Free-form writing: title, body and author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritingDraft {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl DraftPayload for WritingDraft {
    const KIND: &'static str = "writing";

    fn has_content(&self) -> bool {
        [&self.title, &self.content, &self.author]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    fn validate(&self) -> Result<(), String> {
        check_len("title", &self.title, MAX_TITLE_CHARS)?;
        check_len("content", &self.content, MAX_CONTENT_CHARS)?;
        check_len("author", &self.author, MAX_AUTHOR_CHARS)
    }
}

/// A speech being prepared on a topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechDraft {
    pub topic: String,
    pub content: String,
}

impl DraftPayload for SpeechDraft {
    const KIND: &'static str = "speech";

    fn has_content(&self) -> bool {
        !self.topic.trim().is_empty() || !self.content.trim().is_empty()
    }

    fn validate(&self) -> Result<(), String> {
        check_len("topic", &self.topic, MAX_TOPIC_CHARS)?;
        check_len("content", &self.content, MAX_CONTENT_CHARS)
    }
}

/// Rhetorical device practice: a topic, the selected devices and the answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeDraft {
    pub topic: String,
    pub devices: Vec<String>,
    pub content: String,
}

impl DraftPayload for PracticeDraft {
    const KIND: &'static str = "practice";

    fn has_content(&self) -> bool {
        !self.topic.trim().is_empty() || !self.content.trim().is_empty() || !self.devices.is_empty()
    }

    fn validate(&self) -> Result<(), String> {
        check_len("topic", &self.topic, MAX_TOPIC_CHARS)?;
        check_len("content", &self.content, MAX_CONTENT_CHARS)?;
        if self.devices.iter().any(|d| d.trim().is_empty()) {
            return Err("device names must not be blank".to_string());
        }
        Ok(())
    }
}
