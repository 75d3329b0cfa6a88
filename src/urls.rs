//! Reader for newsboat's `urls` file, the source of feed tags.
//!
//! Each line is a feed url followed by its tags, split with shell quoting
//! rules:
//!
//! ```text
//! # comment
//! https://example.com/feed.xml tech "long reads" ~"Custom Title"
//! "query:Unread:unread = \"yes\""
//! ```
//!
//! `~title` overrides and the `!` hidden marker are not tags. Query, exec and
//! filter lines have no fixed url and are skipped.

use std::path::Path;
use thiserror::Error;

use crate::storage::FeedTags;

/// Url schemes newsboat uses for entries that are not plain feeds
const VIRTUAL_SCHEMES: [&str; 3] = ["query:", "exec:", "filter:"];

#[derive(Debug, Error)]
pub enum UrlsError {
    #[error("Failed to read urls file: {0}")]
    Io(#[from] std::io::Error),

    #[error("urls file line {line}: {reason}")]
    Syntax { line: usize, reason: String },
}

pub fn load(path: &Path) -> Result<Vec<FeedTags>, UrlsError> {
    let content = std::fs::read_to_string(path)?;
    let feeds = parse(&content)?;
    tracing::info!(path = %path.display(), feeds = feeds.len(), "Read urls file");
    Ok(feeds)
}

pub fn parse(content: &str) -> Result<Vec<FeedTags>, UrlsError> {
    let mut feeds = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let words = shell_words::split(line).map_err(|e| UrlsError::Syntax {
            line: n + 1,
            reason: e.to_string(),
        })?;
        let Some((url, rest)) = words.split_first() else {
            continue;
        };
        if VIRTUAL_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            tracing::debug!(line = n + 1, "Skipping virtual feed");
            continue;
        }

        let mut tags: Vec<String> = Vec::new();
        for word in rest {
            if word == "!" || word.starts_with('~') || word.is_empty() || tags.contains(word) {
                continue;
            }
            tags.push(word.clone());
        }
        feeds.push(FeedTags {
            rss_url: url.clone(),
            tags,
        });
    }
    Ok(feeds)
}
