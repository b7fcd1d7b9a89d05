use serde::Serialize;
use sha2::{Digest, Sha256};

/// Text and images of one answer slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedAnswer {
    /// `None` when the answer child carried no content history.
    pub text: Option<String>,
    pub images: Vec<String>,
}

impl ParsedAnswer {
    /// Text suitable for the transcript; empty answers count as absent.
    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

/// A follow-up thread with its one level of feedback replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFollowup {
    pub subject: String,
    pub feedback: Vec<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answers {
    #[serde(rename = "i_answer")]
    pub instructor: ParsedAnswer,
    #[serde(rename = "s_answer")]
    pub student: ParsedAnswer,
    pub followups: Vec<ParsedFollowup>,
}

/// A post flattened into plain fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPost {
    pub post_id: Option<u64>,
    pub uid: Option<String>,
    pub title: String,
    pub content_text: String,
    pub image_urls: Vec<String>,
    pub answers: Answers,
}

/// Linear transcript of a post handed to the embedding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationThread {
    pub uid: Option<String>,
    pub conversation_text: String,
}

impl ConversationThread {
    /// SHA-256 of the transcript, hex encoded.
    ///
    /// Identical transcripts always hash the same, so the digest works as a
    /// stable key for embedding records.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.conversation_text.as_bytes());
        hex::encode(hasher.finalize())
    }
}
