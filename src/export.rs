//! File output for processed posts.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::pipeline::ProcessedPost;

/// One line of the thread export.
#[derive(Debug, Serialize)]
struct ThreadRecord<'a> {
    post_id: Option<u64>,
    uid: Option<&'a str>,
    content_hash: String,
    conversation_text: &'a str,
    image_urls: &'a [String],
}

/// One line of the post metadata export.
#[derive(Debug, Serialize)]
struct MetadataRecord<'a> {
    post_id: Option<u64>,
    created: Option<&'a str>,
    title: &'a str,
    folders: &'a [String],
    content_text: &'a str,
}

/// Write one JSON object per processed post.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub async fn write_threads_jsonl(path: &Path, posts: &[ProcessedPost]) -> Result<()> {
    let mut out = String::new();
    for processed in posts {
        let record = ThreadRecord {
            post_id: processed.post.post_id,
            uid: processed.thread.uid.as_deref(),
            content_hash: processed.thread.content_hash(),
            conversation_text: &processed.thread.conversation_text,
            image_urls: &processed.post.image_urls,
        };
        out.push_str(&serde_json::to_string(&record).context("Failed to serialize thread")?);
        out.push('\n');
    }

    write_file(path, out).await?;
    info!(path = %path.display(), threads = posts.len(), "Wrote thread export");
    Ok(())
}

/// Write one metadata line per post: number, creation time, title,
/// folders and tag-stripped content.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub async fn write_post_metadata_jsonl(path: &Path, posts: &[ProcessedPost]) -> Result<()> {
    let mut out = String::new();
    for processed in posts {
        let record = MetadataRecord {
            post_id: processed.post.post_id,
            created: processed.created.as_deref(),
            title: &processed.post.title,
            folders: &processed.folders,
            content_text: &processed.post.content_text,
        };
        out.push_str(&serde_json::to_string(&record).context("Failed to serialize metadata")?);
        out.push('\n');
    }

    write_file(path, out).await?;
    info!(path = %path.display(), posts = posts.len(), "Wrote post metadata");
    Ok(())
}

/// Write a JSON object mapping post number to raw post content.
///
/// Posts without a number are left out.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub async fn write_content_dump(path: &Path, posts: &[ProcessedPost]) -> Result<()> {
    let dump: BTreeMap<u64, &str> = posts
        .iter()
        .filter_map(|p| p.post.post_id.map(|nr| (nr, p.raw_content.as_str())))
        .collect();

    let json = serde_json::to_string(&dump).context("Failed to serialize content dump")?;
    write_file(path, json).await?;
    info!(path = %path.display(), posts = dump.len(), "Wrote content dump");
    Ok(())
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
