use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process (usually newsboat itself) holds the database lock
    #[error("The database is locked by another process. Close newsboat and try again.")]
    Locked,

    /// Schema bootstrap failed
    #[error("Database setup failed: {0}")]
    Migration(String),

    /// A filter query was rejected before reaching SQLite
    #[error("Invalid filter query: {0}")]
    InvalidFilter(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5): database is locked
        // SQLITE_LOCKED (6): database table is locked
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
        {
            return DatabaseError::Locked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Helper Types
// ============================================================================

/// Tags attached to one feed, as read from the newsboat urls file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTags {
    pub rss_url: String,
    pub tags: Vec<String>,
}

/// Internal row type for `rss_item` queries.
///
/// newsboat stores `unread` as an INTEGER(1) and `author`/`content` as
/// NOT NULL text, so the only conversion needed is the `Arc` wrapping.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub url: String,
    pub title: String,
    pub author: String,
    pub feed_url: String,
    pub pub_date: i64,
    pub content: String,
    pub unread: bool,
}

impl ArticleDbRow {
    pub(crate) fn into_article(self) -> Article {
        Article {
            url: self.url,
            title: Arc::from(self.title),
            author: Arc::from(self.author),
            feed_url: self.feed_url,
            pub_date: self.pub_date,
            content: Arc::from(self.content),
            unread: self.unread,
        }
    }
}

/// Row type for feed listings with aggregated counts
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FeedSummaryRow {
    pub rss_url: String,
    pub title: String,
    pub unread_count: i64,
    pub article_count: i64,
}

impl From<FeedSummaryRow> for FeedSummary {
    fn from(row: FeedSummaryRow) -> Self {
        FeedSummary {
            rss_url: row.rss_url,
            title: Arc::from(row.title),
            unread_count: usize::try_from(row.unread_count).unwrap_or(0),
            article_count: usize::try_from(row.article_count).unwrap_or(0),
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// One feed as listed on the main menu or under a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub rss_url: String,
    pub title: Arc<str>,
    pub unread_count: usize,
    pub article_count: usize,
}

/// One RSS item.
///
/// Identity is `url` (exact, case-sensitive). `feed_url` is a back-reference
/// to the owning feed and never implies ownership.
///
/// String fields that are cloned into every container that lists the article
/// use `Arc<str>` so the copies stay cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub url: String,
    pub title: Arc<str>,
    pub author: Arc<str>,
    pub feed_url: String,
    /// Unix timestamp (seconds)
    pub pub_date: i64,
    pub content: Arc<str>,
    pub unread: bool,
}
