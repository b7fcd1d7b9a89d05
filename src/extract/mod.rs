//! Conversion of raw Piazza posts into parsed records and conversation transcripts.
//!
//! Extraction is all-or-nothing per post: any error rejects the whole post so
//! a transcript is never assembled from a partially parsed record.

pub mod conversation;
pub mod html;
pub mod models;
pub mod post;

use thiserror::Error;

pub use conversation::build_conversation;
pub use html::{normalize_html, ImageResolver, NormalizedContent};
pub use models::{Answers, ConversationThread, ParsedAnswer, ParsedFollowup, ParsedPost};
pub use post::{parse_followup, PostExtractor};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("post {post} has no content history")]
    MissingContent { post: String },
    #[error("image reference has no usable location: '{reference}'")]
    MalformedReference { reference: String },
}
