//! Moving between sibling articles without leaving the article view.

use super::sync::container_articles;
use super::Navigator;
use crate::error::NavError;
use crate::page::{same_item, Page};
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Prev,
}

impl<V: View> Navigator<V> {
    /// Index of the displayed article and the unread flags of its siblings
    fn position(&self) -> Result<(usize, Vec<bool>), NavError> {
        let Page::Article(article) = self.stack.top() else {
            return Err(NavError::invalid("Not inside an article"));
        };
        let parent = self.stack.parent();
        let Some(siblings) = parent.and_then(container_articles) else {
            return Err(NavError::invalid("Previous page is not a feed/filter."));
        };
        let idx = siblings
            .iter()
            .position(|a| same_item(a, article))
            .ok_or_else(|| NavError::not_found("Couldn't find article in its container."))?;
        Ok((idx, siblings.iter().map(|a| a.unread).collect()))
    }

    /// Jump to the closest unread sibling. Nothing happens when there is none.
    async fn step_unread(&mut self, direction: Direction) -> Result<(), NavError> {
        let (idx, unread) = self.position()?;
        let target = match direction {
            Direction::Next => (idx + 1..unread.len()).find(|&i| unread[i]),
            Direction::Prev => (0..idx).rev().find(|&i| unread[i]),
        };
        match target {
            Some(target) => self.land_on(target).await,
            None => {
                tracing::debug!(?direction, "No unread article left");
                Ok(())
            }
        }
    }

    /// Move to the adjacent sibling, failing at either end of the list
    async fn step_article(&mut self, direction: Direction) -> Result<(), NavError> {
        let (idx, siblings) = self.position()?;
        let target = match direction {
            Direction::Next => Some(idx + 1).filter(|&i| i < siblings.len()),
            Direction::Prev => idx.checked_sub(1),
        };
        let Some(target) = target else {
            return Err(NavError::Boundary(match direction {
                Direction::Next => "last",
                Direction::Prev => "first",
            }));
        };
        self.land_on(target).await
    }

    pub(super) async fn next_unread(&mut self) -> Result<(), NavError> {
        self.step_unread(Direction::Next).await
    }

    pub(super) async fn prev_unread(&mut self) -> Result<(), NavError> {
        self.step_unread(Direction::Prev).await
    }

    pub(super) async fn next_article(&mut self) -> Result<(), NavError> {
        self.step_article(Direction::Next).await
    }

    pub(super) async fn prev_article(&mut self) -> Result<(), NavError> {
        self.step_article(Direction::Prev).await
    }
}
