//! Piazza RPC access.

pub mod client;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

pub use client::PiazzaClient;
pub use models::{FeedItem, RawChild, RawPost, Revision};

#[derive(Debug, Error)]
pub enum PiazzaError {
    #[error("{method} returned an error instead of a result: {message}")]
    UpstreamFeed { method: String, message: String },
    #[error("login failed: {0}")]
    Login(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode {method} response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid Piazza base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Supplier of feed listings and full posts.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Posts the platform reports as unresolved.
    async fn unresolved_feed(&self) -> Result<Vec<FeedItem>, PiazzaError>;

    /// Up to `limit` posts of the whole course feed, newest first.
    async fn feed(&self, limit: u32) -> Result<Vec<FeedItem>, PiazzaError>;

    /// Full content of one post, addressed by id or post number.
    async fn fetch_post(&self, cid: &str) -> Result<RawPost, PiazzaError>;
}
