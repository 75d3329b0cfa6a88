//! Article containers: a subscribed feed and a saved filter.
//!
//! Both own *copies* of their articles, including the unread flag. Those
//! copies are only written through `set_unread_at`, which the read-state
//! synchronizer in `nav::sync` is the sole caller of.

use std::sync::Arc;

use super::{article, Table};
use crate::error::NavError;
use crate::storage::{Article, Database};

/// Prefix that marks a main-menu id as a filter id
pub const FILTER_PREFIX: &str = "query:";

fn position(articles: &[Article], url: &str) -> Option<usize> {
    articles.iter().position(|a| a.url == url)
}

/// Whether two copies stand for the same `rss_item` row.
///
/// newsboat keeps one row per feed for a link, so the url alone is not
/// enough inside a filter that spans feeds.
pub fn same_item(a: &Article, b: &Article) -> bool {
    a.url == b.url && a.feed_url == b.feed_url && a.pub_date == b.pub_date
}

fn article_table(articles: &[Article]) -> Table {
    let mut table = Table::with_columns(5);
    for a in articles {
        table.push_row([
            article::prefix(a).to_string(),
            article::date(a.pub_date),
            crate::text::cell(&a.author),
            crate::text::cell(&a.title),
            a.url.clone(),
        ]);
    }
    table
}

// ============================================================================
// Feed
// ============================================================================

/// One subscribed feed with its articles, newest first.
///
/// `unread_count` always equals the number of articles whose flag is set; it
/// is recomputed from the list whenever a flag changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub rss_url: String,
    pub title: Arc<str>,
    unread_count: usize,
    articles: Vec<Article>,
}

impl Feed {
    pub fn new(rss_url: impl Into<String>, title: impl Into<Arc<str>>, articles: Vec<Article>) -> Self {
        let mut feed = Self {
            rss_url: rss_url.into(),
            title: title.into(),
            unread_count: 0,
            articles,
        };
        feed.recount();
        feed
    }

    /// Load a feed and its articles, `None` if the url is not in the cache
    pub async fn query(db: &Database, rss_url: &str) -> Result<Option<Self>, NavError> {
        let Some(summary) = db.get_feed(rss_url).await? else {
            return Ok(None);
        };
        let articles = db.get_articles_for_feed(rss_url).await?;
        Ok(Some(Self::new(summary.rss_url, summary.title, articles)))
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub fn render(&self) -> Table {
        article_table(&self.articles)
    }

    /// Fetch the selected article fresh from the store.
    ///
    /// The url must be one of this feed's articles. Copies of the same link
    /// under other feeds are never returned.
    pub async fn resolve_child(&self, db: &Database, url: &str) -> Result<Article, NavError> {
        self.element_index(url)?;
        db.get_feed_article(&self.rss_url, url)
            .await?
            .ok_or_else(|| NavError::not_found(format!("Article {url} is no longer in the database")))
    }

    pub async fn refresh(&self, db: &Database) -> Result<Self, NavError> {
        Self::query(db, &self.rss_url)
            .await?
            .ok_or_else(|| NavError::not_found(format!("Feed {} is no longer in the database", self.rss_url)))
    }

    pub fn element_index(&self, url: &str) -> Result<usize, NavError> {
        position(&self.articles, url)
            .ok_or_else(|| NavError::not_found("Couldn't find article in feed."))
    }

    pub(crate) fn set_unread_at(&mut self, idx: usize, unread: bool) {
        if let Some(a) = self.articles.get_mut(idx) {
            a.unread = unread;
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.unread_count = self.articles.iter().filter(|a| a.unread).count();
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Parsed filter id: `query:<name>:<query>[:<tags>]`.
///
/// `<tags>` is comma separated; a leading `!` excludes the tag. Neither the
/// name nor the query may contain `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterId {
    raw: String,
    pub name: String,
    pub query: String,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
}

impl FilterId {
    /// Build an id from its parts
    pub fn new(name: &str, query: &str, tags: &[String]) -> Self {
        let mut raw = format!("{FILTER_PREFIX}{name}:{query}");
        if !tags.is_empty() {
            raw.push(':');
            raw.push_str(&tags.join(","));
        }
        let (include_tags, exclude_tags) = split_tags(tags.iter().map(String::as_str));
        Self {
            raw,
            name: name.to_string(),
            query: query.to_string(),
            include_tags,
            exclude_tags,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, NavError> {
        let malformed = || NavError::not_found(format!("Malformed filter id: {raw}"));
        let rest = raw.strip_prefix(FILTER_PREFIX).ok_or_else(malformed)?;
        let mut parts = rest.splitn(3, ':');
        let name = parts.next().map(str::trim).unwrap_or_default();
        let query = parts.next().ok_or_else(malformed)?;
        if name.is_empty() {
            return Err(malformed());
        }
        let (include_tags, exclude_tags) = split_tags(parts.next().unwrap_or("").split(','));
        Ok(Self {
            raw: raw.to_string(),
            name: name.to_string(),
            query: query.trim().to_string(),
            include_tags,
            exclude_tags,
        })
    }

    /// The id exactly as it was written, used to re-display the filter
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_tags<'a>(tags: impl Iterator<Item = &'a str>) -> (Vec<String>, Vec<String>) {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for tag in tags.map(str::trim).filter(|t| !t.is_empty()) {
        match tag.strip_prefix('!') {
            Some(excluded) => exclude.push(excluded.trim().to_string()),
            None => include.push(tag.to_string()),
        }
    }
    (include, exclude)
}

/// Result of running a saved filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub id: FilterId,
    articles: Vec<Article>,
}

impl Filter {
    pub fn new(id: FilterId, articles: Vec<Article>) -> Self {
        Self { id, articles }
    }

    pub async fn query(db: &Database, id: FilterId) -> Result<Self, NavError> {
        let articles = db
            .run_filter(&id.query, &id.include_tags, &id.exclude_tags)
            .await?;
        Ok(Self::new(id, articles))
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn render(&self) -> Table {
        article_table(&self.articles)
    }

    /// Selected article from the cached result list
    pub fn resolve_child(&self, url: &str) -> Result<Article, NavError> {
        let idx = self.element_index(url)?;
        Ok(self.articles[idx].clone())
    }

    pub async fn refresh(&self, db: &Database) -> Result<Self, NavError> {
        Self::query(db, self.id.clone()).await
    }

    pub fn element_index(&self, url: &str) -> Result<usize, NavError> {
        position(&self.articles, url)
            .ok_or_else(|| NavError::not_found("Couldn't find article in filter."))
    }

    pub(crate) fn set_unread_at(&mut self, idx: usize, unread: bool) {
        if let Some(a) = self.articles.get_mut(idx) {
            a.unread = unread;
        }
    }
}
