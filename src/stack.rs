//! Navigation history.

use crate::page::{MainMenu, Page};

/// Ordered, never-empty stack of pages whose bottom is always a main menu.
///
/// The root is held apart from the pages above it. The constructor and
/// [`reset`](PageStack::reset) only accept a [`MainMenu`], and
/// [`pop`](PageStack::pop) never touches the root.
#[derive(Debug, Clone)]
pub struct PageStack {
    root: Page,
    above: Vec<Page>,
}

impl PageStack {
    pub fn new(root: MainMenu) -> Self {
        Self {
            root: Page::MainMenu(root),
            above: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.above.len() + 1
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn top(&self) -> &Page {
        self.above.last().unwrap_or(&self.root)
    }

    /// Pages are only edited in place (flag updates); swapping the variant
    /// goes through `replace_top`.
    pub(crate) fn top_mut(&mut self) -> &mut Page {
        self.above.last_mut().unwrap_or(&mut self.root)
    }

    /// The page directly below the top, if any
    pub fn parent(&self) -> Option<&Page> {
        match self.above.len() {
            0 => None,
            1 => Some(&self.root),
            n => self.above.get(n - 2),
        }
    }

    /// Top and the page below it, borrowed mutably at the same time
    pub(crate) fn top_and_parent_mut(&mut self) -> Option<(&mut Page, &mut Page)> {
        match self.above.as_mut_slice() {
            [] => None,
            [top] => Some((top, &mut self.root)),
            [.., parent, top] => Some((top, parent)),
        }
    }

    pub fn push(&mut self, page: Page) {
        self.above.push(page);
    }

    /// Remove and return the top page; the root is never removed
    pub fn pop(&mut self) -> Option<Page> {
        self.above.pop()
    }

    /// Swap the top page for `page`. When only the root is left, a main menu
    /// replaces it and any other page is pushed on top of it.
    pub fn replace_top(&mut self, page: Page) {
        if let Some(top) = self.above.last_mut() {
            *top = page;
            return;
        }
        match page {
            Page::MainMenu(menu) => self.root = Page::MainMenu(menu),
            page => self.above.push(page),
        }
    }

    /// Drop all history and start over from `root`
    pub fn reset(&mut self, root: MainMenu) {
        self.above.clear();
        self.root = Page::MainMenu(root);
    }

    /// Bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        std::iter::once(&self.root).chain(self.above.iter())
    }
}
