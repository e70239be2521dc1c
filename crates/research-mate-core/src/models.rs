//! Core data models shared by the transport layer and the controllers.
//!
//! Wire types mirror the backend's JSON exactly; state types (turns, cards)
//! exist only in client memory and never outlive the session.

use serde::{Deserialize, Deserializer, Serialize};

/// Where a session document came from.
///
/// Any value other than `"scholar"` is treated as an upload, matching how the
/// backend's own page distinguishes the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Scholar,
    #[default]
    #[serde(other)]
    Upload,
}

/// A document attached to the current backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    #[serde(default)]
    pub source: DocumentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DocumentEntry {
    pub fn upload(filename: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Upload,
            filename: Some(filename.into()),
            title: None,
            link: None,
        }
    }

    pub fn scholar(
        filename: impl Into<String>,
        title: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            source: DocumentSource::Scholar,
            filename: Some(filename.into()),
            title: Some(title.into()),
            link,
        }
    }

    /// The key the backend deletes by. Scholar entries use it too.
    pub fn delete_key(&self) -> Option<&str> {
        self.filename.as_deref().filter(|f| !f.is_empty())
    }
}

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Transcript-scoped identity of a turn. Monotonic within one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnKey(pub u64);

/// One entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub key: TurnKey,
    pub role: Role,
    pub text: String,
    pub pending: bool,
}

/// A paper returned by the search backend.
///
/// Sent back verbatim when the user adds it to the session. The backend may
/// report `null` for `title` or `link`; both deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default)]
    pub publication_info: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-card state of the "add to documents" button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddState {
    #[default]
    Idle,
    Adding,
    Added,
    Failed,
}

impl AddState {
    pub fn label(&self) -> &'static str {
        match self {
            AddState::Idle => "Add to Documents",
            AddState::Adding => "Adding...",
            AddState::Added => "✓ Added",
            AddState::Failed => "Failed",
        }
    }

    /// Only an idle card accepts a click.
    pub fn accepts_click(&self) -> bool {
        matches!(self, AddState::Idle)
    }
}
