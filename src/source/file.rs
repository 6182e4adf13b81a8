// JSON post files — the hand-off format between `fetch` and `analyze`.
//
// A file is a JSON array of objects with a required `content` field and
// optional `timestamp` (or `date`), `url` and `author` (or `user`).
// Indices are assigned by array position; any `index` already in the file
// is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Post;

#[derive(Debug, Deserialize)]
struct PostRecord {
    content: String,
    #[serde(default, alias = "date")]
    timestamp: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, alias = "user")]
    author: Option<String>,
}

/// Parse posts from a JSON array string.
pub fn parse_posts(json: &str) -> Result<Vec<Post>> {
    let records: Vec<PostRecord> =
        serde_json::from_str(json).context("Expected a JSON array of posts with a content field")?;

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Post {
            index,
            content: record.content,
            timestamp: record.timestamp,
            url: record.url,
            author: record.author,
        })
        .collect())
}

/// Read posts from a JSON file.
pub fn load_posts_file(path: &Path) -> Result<Vec<Post>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read posts file {}", path.display()))?;
    parse_posts(&json).with_context(|| format!("Failed to parse posts file {}", path.display()))
}

/// Write posts as a pretty-printed JSON array.
pub fn write_posts_file(path: &Path, posts: &[Post]) -> Result<()> {
    let json = serde_json::to_string_pretty(posts).context("Failed to serialize posts")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write posts file {}", path.display()))
}
