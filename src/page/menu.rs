//! Listing pages: the main menu, the tag list and the feeds under a tag.

use super::feed::{Feed, Filter, FilterId, FILTER_PREFIX};
use super::{Page, Table};
use crate::error::NavError;
use crate::storage::{Database, FeedSummary};
use crate::text;

/// Marker shown in the prefix column for saved filters
const FILTER_MARKER: &str = "Q";

/// `N (unread/total)` when anything is unread, `  (unread/total)` otherwise
pub fn feed_prefix(feed: &FeedSummary) -> String {
    let marker = if feed.unread_count > 0 { "N" } else { " " };
    format!("{marker} ({}/{})", feed.unread_count, feed.article_count)
}

fn feed_rows(table: &mut Table, feeds: &[FeedSummary]) {
    for feed in feeds {
        table.push_row([feed_prefix(feed), text::cell(&feed.title), feed.rss_url.clone()]);
    }
}

async fn load_feed(db: &Database, rss_url: &str) -> Result<Page, NavError> {
    Feed::query(db, rss_url)
        .await?
        .map(Page::Feed)
        .ok_or_else(|| NavError::not_found(format!("No feed with url {rss_url}")))
}

// ============================================================================
// MainMenu
// ============================================================================

/// Saved filters followed by every feed in the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainMenu {
    pub filters: Vec<FilterId>,
    pub feeds: Vec<FeedSummary>,
}

impl MainMenu {
    pub async fn query(db: &Database, filters: Vec<FilterId>) -> Result<Self, NavError> {
        let feeds = db.get_main_feeds().await?;
        Ok(Self { filters, feeds })
    }

    pub fn render(&self) -> Table {
        let mut table = Table::with_columns(3);
        for filter in &self.filters {
            table.push_row([
                FILTER_MARKER.to_string(),
                text::cell(&filter.name),
                filter.as_str().to_string(),
            ]);
        }
        feed_rows(&mut table, &self.feeds);
        table
    }

    /// `http…` ids open a feed, `query:…` ids run a filter
    pub async fn resolve_child(&self, db: &Database, id: &str) -> Result<Page, NavError> {
        if id.starts_with("http") {
            load_feed(db, id).await
        } else if id.starts_with(FILTER_PREFIX) {
            let filter_id = FilterId::parse(id)?;
            Ok(Page::Filter(Filter::query(db, filter_id).await?))
        } else {
            Err(NavError::not_found(format!("Nothing to open for '{id}'")))
        }
    }

    pub async fn refresh(&self, db: &Database) -> Result<Self, NavError> {
        Self::query(db, self.filters.clone()).await
    }

    /// Row position of a filter id or feed url
    pub fn element_index(&self, id: &str) -> Result<usize, NavError> {
        self.filters
            .iter()
            .map(FilterId::as_str)
            .chain(self.feeds.iter().map(|f| f.rss_url.as_str()))
            .position(|candidate| candidate == id)
            .ok_or_else(|| NavError::not_found(format!("Couldn't find {id} in the main menu.")))
    }
}

// ============================================================================
// TagsPage
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagsPage {
    pub tags: Vec<String>,
}

impl TagsPage {
    pub async fn query(db: &Database) -> Result<Self, NavError> {
        Ok(Self {
            tags: db.get_tags().await?,
        })
    }

    pub fn render(&self) -> Table {
        let mut table = Table::with_columns(2);
        for tag in &self.tags {
            table.push_row([text::cell(tag), tag.clone()]);
        }
        table
    }

    pub async fn resolve_child(&self, db: &Database, tag: &str) -> Result<Page, NavError> {
        self.element_index(tag)?;
        Ok(Page::TagFeeds(TagFeeds::query(db, tag).await?))
    }

    pub async fn refresh(&self, db: &Database) -> Result<Self, NavError> {
        Self::query(db).await
    }

    pub fn element_index(&self, tag: &str) -> Result<usize, NavError> {
        self.tags
            .iter()
            .position(|t| t == tag)
            .ok_or_else(|| NavError::not_found(format!("No tag named {tag}")))
    }
}

// ============================================================================
// TagFeeds
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFeeds {
    pub tag: String,
    pub feeds: Vec<FeedSummary>,
}

impl TagFeeds {
    pub async fn query(db: &Database, tag: &str) -> Result<Self, NavError> {
        Ok(Self {
            tag: tag.to_string(),
            feeds: db.get_tag_feeds(tag).await?,
        })
    }

    pub fn render(&self) -> Table {
        let mut table = Table::with_columns(3);
        feed_rows(&mut table, &self.feeds);
        table
    }

    pub async fn resolve_child(&self, db: &Database, rss_url: &str) -> Result<Page, NavError> {
        load_feed(db, rss_url).await
    }

    pub async fn refresh(&self, db: &Database) -> Result<Self, NavError> {
        Self::query(db, &self.tag).await
    }

    pub fn element_index(&self, rss_url: &str) -> Result<usize, NavError> {
        self.feeds
            .iter()
            .position(|f| f.rss_url == rss_url)
            .ok_or_else(|| NavError::not_found(format!("Couldn't find {rss_url} under tag {}.", self.tag)))
    }
}
