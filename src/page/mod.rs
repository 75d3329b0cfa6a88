//! The closed set of pages that can sit on the navigation stack.
//!
//! Every variant offers the same four capabilities:
//!
//! - **render**: parallel text columns for the host to lay out
//! - **resolve_child**: the page to push for a selected id
//! - **refresh**: a fresh copy re-queried from the store
//! - **element_index**: position of a child id among the page's rows

pub mod article;
mod feed;
mod menu;

use serde::Serialize;

use crate::error::NavError;
use crate::storage::{Article, Database};

pub use feed::{same_item, Feed, Filter, FilterId, FILTER_PREFIX};
pub use menu::{feed_prefix, MainMenu, TagFeeds, TagsPage};

/// Parallel columns of text; every column has one cell per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<Vec<String>>,
}

impl Table {
    fn with_columns(n: usize) -> Self {
        Self {
            columns: vec![Vec::new(); n],
        }
    }

    fn push_row<const N: usize>(&mut self, row: [String; N]) {
        debug_assert_eq!(N, self.columns.len());
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
    }

    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    MainMenu(MainMenu),
    Tags(TagsPage),
    TagFeeds(TagFeeds),
    Filter(Filter),
    Feed(Feed),
    Article(Article),
}

impl Page {
    /// Variant name, used in logs and by the host to pick a layout
    pub fn kind(&self) -> &'static str {
        match self {
            Page::MainMenu(_) => "MainMenu",
            Page::Tags(_) => "TagsPage",
            Page::TagFeeds(_) => "TagFeeds",
            Page::Filter(_) => "Filter",
            Page::Feed(_) => "Feed",
            Page::Article(_) => "Article",
        }
    }

    pub fn render(&self) -> Table {
        match self {
            Page::MainMenu(p) => p.render(),
            Page::Tags(p) => p.render(),
            Page::TagFeeds(p) => p.render(),
            Page::Filter(p) => p.render(),
            Page::Feed(p) => p.render(),
            Page::Article(a) => article::render(a),
        }
    }

    /// Page to push for `id`, or `None` when the page is a leaf.
    ///
    /// Resolving an article does not touch its read flag; marking it read is
    /// the navigator's job.
    pub async fn resolve_child(&self, db: &Database, id: &str) -> Result<Option<Page>, NavError> {
        let child = match self {
            Page::MainMenu(p) => p.resolve_child(db, id).await?,
            Page::Tags(p) => p.resolve_child(db, id).await?,
            Page::TagFeeds(p) => p.resolve_child(db, id).await?,
            Page::Filter(p) => Page::Article(p.resolve_child(id)?),
            Page::Feed(p) => Page::Article(p.resolve_child(db, id).await?),
            Page::Article(_) => return Ok(None),
        };
        Ok(Some(child))
    }

    pub async fn refresh(&self, db: &Database) -> Result<Page, NavError> {
        Ok(match self {
            Page::MainMenu(p) => Page::MainMenu(p.refresh(db).await?),
            Page::Tags(p) => Page::Tags(p.refresh(db).await?),
            Page::TagFeeds(p) => Page::TagFeeds(p.refresh(db).await?),
            Page::Filter(p) => Page::Filter(p.refresh(db).await?),
            Page::Feed(p) => Page::Feed(p.refresh(db).await?),
            Page::Article(a) => Page::Article(
                db.get_feed_article(&a.feed_url, &a.url)
                    .await?
                    .ok_or_else(|| NavError::not_found(format!("Article {} is no longer in the database", a.url)))?,
            ),
        })
    }

    pub fn element_index(&self, id: &str) -> Result<usize, NavError> {
        match self {
            Page::MainMenu(p) => p.element_index(id),
            Page::Tags(p) => p.element_index(id),
            Page::TagFeeds(p) => p.element_index(id),
            Page::Filter(p) => p.element_index(id),
            Page::Feed(p) => p.element_index(id),
            Page::Article(_) => Err(NavError::not_found("An article has no entries.")),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_article(url: &str, unread: bool) -> Article {
    Article {
        url: url.to_string(),
        title: url.rsplit('/').next().unwrap_or(url).into(),
        author: "Author".into(),
        feed_url: "http://example.com/feed".to_string(),
        pub_date: 1_704_067_200,
        content: "".into(),
        unread,
    }
}
