//! Read-state synchronization.
//!
//! This is the only code that changes an unread flag. Every change follows
//! the same order: write the store, then update every in-memory copy of the
//! affected urls, then notify. A failed store write therefore returns before
//! anything in memory has moved.
//!
//! The store keeps one row per feed for a link and updates them all by url,
//! so the in-memory side is matched by url too, never by a single position.

use super::Navigator;
use crate::error::NavError;
use crate::page::Page;
use crate::storage::Article;
use crate::view::{UnreadChange, View};

/// Articles held by a container page, `None` for every other page
pub(super) fn container_articles(page: &Page) -> Option<&[Article]> {
    match page {
        Page::Feed(feed) => Some(feed.articles()),
        Page::Filter(filter) => Some(filter.articles()),
        _ => None,
    }
}

/// Set the flag of the article at `idx` inside a feed or filter
fn set_container_flag(page: &mut Page, idx: usize, unread: bool) {
    match page {
        Page::Feed(feed) => feed.set_unread_at(idx, unread),
        Page::Filter(filter) => filter.set_unread_at(idx, unread),
        _ => {}
    }
}

/// Set the flag of every article of `page` whose url is in `urls`
fn apply_to_page(page: &mut Page, urls: &[String], unread: bool) {
    if let Page::Article(article) = page {
        if urls.contains(&article.url) {
            article.unread = unread;
        }
        return;
    }
    let positions: Vec<usize> = container_articles(page)
        .map(|articles| {
            articles
                .iter()
                .enumerate()
                .filter(|(_, a)| urls.contains(&a.url))
                .map(|(idx, _)| idx)
                .collect()
        })
        .unwrap_or_default();
    for idx in positions {
        set_container_flag(page, idx, unread);
    }
}

impl<V: View> Navigator<V> {
    /// Store write followed by the change notification
    async fn write_flag(&self, urls: &[String], unread: bool) -> Result<(), NavError> {
        if unread {
            self.db.set_unread(urls).await?;
        } else {
            self.db.set_read(urls).await?;
        }
        tracing::debug!(count = urls.len(), unread, "Updated read state");
        self.notifier.notify(UnreadChange {
            urls: urls.to_vec(),
            unread,
        });
        Ok(())
    }

    /// Mark an article read as it is opened from the current top page.
    ///
    /// The returned copy carries the new flag and is ready to be pushed.
    pub(super) async fn open_article(&mut self, mut article: Article) -> Result<Article, NavError> {
        let urls = [article.url.clone()];
        self.write_flag(&urls, false).await?;
        apply_to_page(self.stack.top_mut(), &urls, false);
        article.unread = false;
        Ok(article)
    }

    /// Replace the article on top with the one at `idx` in the container
    /// below it, marking it read.
    pub(super) async fn land_on(&mut self, idx: usize) -> Result<(), NavError> {
        let mut landed = self
            .stack
            .parent()
            .and_then(container_articles)
            .and_then(|articles| articles.get(idx))
            .cloned()
            .ok_or_else(|| NavError::invalid("Previous page is not a feed/filter."))?;
        let urls = [landed.url.clone()];

        self.write_flag(&urls, false).await?;

        landed.unread = false;
        let Some((top, parent)) = self.stack.top_and_parent_mut() else {
            return Ok(());
        };
        apply_to_page(parent, &urls, false);
        let mut previous = std::mem::replace(top, Page::Article(landed));
        if let Err(e) = self.show_top() {
            apply_to_page(&mut previous, &urls, false);
            *self.stack.top_mut() = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Flip the flag of the displayed article and return to its container.
    pub(super) async fn toggle_current(&mut self) -> Result<(), NavError> {
        let Page::Article(article) = self.stack.top() else {
            return Err(NavError::invalid("Not inside an article"));
        };
        let urls = [article.url.clone()];
        let unread = !article.unread;

        self.write_flag(&urls, unread).await?;

        let Some(mut popped) = self.stack.pop() else {
            return Ok(());
        };
        apply_to_page(&mut popped, &urls, unread);
        apply_to_page(self.stack.top_mut(), &urls, unread);
        if let Err(e) = self.show_top() {
            self.stack.push(popped);
            return Err(e);
        }
        Ok(())
    }

    /// Toggle a set of urls as one unit: all read if any is unread,
    /// otherwise all unread.
    ///
    /// A filter on top and an article with its container are updated in
    /// place. Other pages are re-read from the store.
    pub(super) async fn toggle_batch(&mut self, urls: Vec<String>) -> Result<(), NavError> {
        let unread = !self.db.any_unread(&urls).await?;
        self.write_flag(&urls, unread).await?;

        if matches!(self.stack.top(), Page::Filter(_)) {
            apply_to_page(self.stack.top_mut(), &urls, unread);
        } else if matches!(self.stack.top(), Page::Article(_)) {
            if let Some((top, parent)) = self.stack.top_and_parent_mut() {
                apply_to_page(top, &urls, unread);
                apply_to_page(parent, &urls, unread);
            }
        } else {
            let fresh = match self.stack.top().refresh(&self.db).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::warn!(error = %e, "Read state saved but the page could not be reloaded");
                    return Err(e);
                }
            };
            self.stack.replace_top(fresh);
        }
        self.show_top()
    }
}
