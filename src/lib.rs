//! Piazza conversation extractor library.
//!
//! Pulls posts from a Piazza course feed, flattens each post with its answers
//! and follow-ups into a typed record, and renders it as a plain-text
//! conversation transcript for downstream embedding.

pub mod config;
pub mod constants;
pub mod export;
pub mod extract;
pub mod piazza;
pub mod pipeline;
