//! Wire types for the Piazza RPC API.
//!
//! The API omits fields freely and sends `null` for others, so every field
//! is either optional or falls back to empty in both cases.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A top-level post as returned by `content.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    /// Per-course post number.
    pub nr: Option<u64>,
    /// Opaque unique id.
    pub id: Option<String>,
    /// Revisions, newest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<Revision>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawChild>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub folders: Vec<String>,
}

impl RawPost {
    /// The newest revision, if the post has any.
    #[must_use]
    pub fn latest(&self) -> Option<&Revision> {
        self.history.first()
    }

    /// Human-readable handle for log lines and errors.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.nr, self.id.as_deref()) {
            (Some(nr), _) => format!("@{nr}"),
            (None, Some(id)) => id.to_string(),
            (None, None) => "<unknown>".to_string(),
        }
    }
}

/// One revision of a post or answer body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    pub created: Option<String>,
}

/// A node in a post's reply tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChild {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    pub id: Option<String>,
    /// Author of the node.
    pub uid: Option<String>,
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<Revision>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawChild>,
}

/// Classification of a [`RawChild`] by its `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    InstructorAnswer,
    StudentAnswer,
    /// Contains "answer" but is neither known answer type.
    OtherAnswer,
    Followup,
    Other,
}

impl RawChild {
    #[must_use]
    pub fn classify(&self) -> ChildKind {
        match self.kind.as_str() {
            "i_answer" => ChildKind::InstructorAnswer,
            "s_answer" => ChildKind::StudentAnswer,
            "followup" => ChildKind::Followup,
            kind if kind.contains("answer") => ChildKind::OtherAnswer,
            _ => ChildKind::Other,
        }
    }
}

/// Envelope wrapping every RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<Value>,
}

impl<T> RpcResponse<T> {
    /// The `result` payload, or the platform's error message when it is absent.
    ///
    /// # Errors
    ///
    /// Returns the error message if `result` is null or missing.
    pub fn into_result(self) -> Result<T, String> {
        match (self.result, self.error) {
            (Some(result), _) => Ok(result),
            (None, Some(Value::String(message))) => Err(message),
            (None, Some(Value::Null) | None) => Err("empty result".to_string()),
            (None, Some(other)) => Err(other.to_string()),
        }
    }
}

/// `result` payload of the feed listing calls.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub feed: Vec<FeedItem>,
}

/// Summary entry in a feed listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub nr: u64,
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_answer: u8,
}

impl FeedItem {
    /// Whether the platform flags this post as still lacking an answer.
    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        self.no_answer == 1
    }
}
