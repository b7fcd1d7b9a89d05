//! Feed -> fetch -> extract -> transcript driver.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{Config, FeedMode};
use crate::extract::{build_conversation, ConversationThread, ExtractError, ParsedPost, PostExtractor};
use crate::piazza::{FeedItem, PostSource, RawPost};

/// Knobs for a single pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub feed_mode: FeedMode,
    pub feed_limit: u32,
    pub unanswered_only: bool,
    /// Fixed pause between post fetches to stay under the request quota.
    pub request_delay: Duration,
    pub include_followups: bool,
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            feed_mode: config.feed_mode,
            feed_limit: config.feed_limit,
            unanswered_only: config.unanswered_only,
            request_delay: config.request_delay,
            include_followups: config.include_followups,
        }
    }
}

/// A post that made it all the way through extraction.
#[derive(Debug, Clone)]
pub struct ProcessedPost {
    /// Newest revision body exactly as fetched.
    pub raw_content: String,
    /// Creation timestamp of the newest revision.
    pub created: Option<String>,
    pub folders: Vec<String>,
    pub post: ParsedPost,
    pub thread: ConversationThread,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub processed: Vec<ProcessedPost>,
    pub skipped: usize,
}

/// List the feed and process every selected post once.
///
/// A failure on one post is logged and counted in
/// [`PipelineReport::skipped`]; only a failed feed listing aborts the run.
///
/// # Errors
///
/// Returns an error if the feed cannot be listed.
pub async fn run_once(
    source: &dyn PostSource,
    extractor: &PostExtractor,
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    let feed = match options.feed_mode {
        FeedMode::Unresolved => source.unresolved_feed().await,
        FeedMode::All => source.feed(options.feed_limit).await,
    }
    .context("Failed to list feed")?;

    let total = feed.len();
    let selected: Vec<FeedItem> = feed
        .into_iter()
        .filter(|item| !options.unanswered_only || item.is_unanswered())
        .collect();
    info!(total, selected = selected.len(), mode = ?options.feed_mode, "Fetched feed");

    let mut report = PipelineReport::default();

    for (index, item) in selected.iter().enumerate() {
        if index > 0 && !options.request_delay.is_zero() {
            tokio::time::sleep(options.request_delay).await;
        }

        match process_item(source, extractor, item, options.include_followups).await {
            Ok(processed) => {
                debug!(
                    post_nr = item.nr,
                    subject = item.subject.as_deref().unwrap_or_default(),
                    uid = ?processed.thread.uid,
                    followups = processed.post.answers.followups.len(),
                    "Processed post"
                );
                report.processed.push(processed);
            }
            Err(e) => {
                warn!(
                    post_nr = item.nr,
                    subject = item.subject.as_deref().unwrap_or_default(),
                    "Failed to process post: {e:#}"
                );
                report.skipped += 1;
            }
        }
    }

    info!(
        processed = report.processed.len(),
        skipped = report.skipped,
        "Pipeline run complete"
    );

    Ok(report)
}

async fn process_item(
    source: &dyn PostSource,
    extractor: &PostExtractor,
    item: &FeedItem,
    include_followups: bool,
) -> Result<ProcessedPost> {
    let raw = source
        .fetch_post(&item.nr.to_string())
        .await
        .with_context(|| format!("Failed to fetch post @{}", item.nr))?;

    process_post(extractor, &raw, include_followups)
        .with_context(|| format!("Failed to extract post @{}", item.nr))
}

/// Extract and assemble one already-fetched post.
///
/// # Errors
///
/// Returns an error if extraction fails; no partial result is produced.
pub fn process_post(
    extractor: &PostExtractor,
    raw: &RawPost,
    include_followups: bool,
) -> Result<ProcessedPost, ExtractError> {
    let post = extractor.parse_post(raw)?;
    let thread = build_conversation(&post, include_followups);
    let latest = raw.latest();

    Ok(ProcessedPost {
        raw_content: latest
            .map(|revision| revision.content.clone())
            .unwrap_or_default(),
        created: latest.and_then(|revision| revision.created.clone()),
        folders: raw.folders.clone(),
        post,
        thread,
    })
}
