//! Command-driven navigation over the page stack.
//!
//! A [`Navigator`] is the whole runtime context: the database handle, the
//! page stack, the configured filters, the host view and the unread
//! notifier. Commands take `&mut self`, so they run strictly one at a time
//! and each either completes or fails without touching the stack. When the
//! view fails to display a new page, the stack change is rolled back; read
//! flags already written to the store stay applied in memory.
//!
//! The implementation is split by concern:
//!
//! - this file: dispatch and the stack-shaping verbs
//! - [`traverse`]: next/prev article and next/prev unread
//! - [`sync`]: every write of an unread flag

mod sync;
mod traverse;

use crate::command::{Command, ToggleTarget};
use crate::error::NavError;
use crate::page::{FilterId, MainMenu, Page, TagsPage};
use crate::stack::PageStack;
use crate::storage::Database;
use crate::view::{Notifier, View, DEFAULT_CURSOR};

pub struct Navigator<V: View> {
    db: Database,
    view: V,
    stack: PageStack,
    filters: Vec<FilterId>,
    notifier: Notifier,
}

impl<V: View> Navigator<V> {
    /// Start with an empty main menu; `enable` fills it from the store.
    pub fn new(db: Database, view: V) -> Self {
        Self {
            db,
            view,
            stack: PageStack::new(MainMenu::default()),
            filters: Vec::new(),
            notifier: Notifier::disabled(),
        }
    }

    /// Saved filters listed at the top of the main menu
    pub fn with_filters(mut self, filters: Vec<FilterId>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn stack(&self) -> &PageStack {
        &self.stack
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Close the database. Consumes the navigator so no command can follow.
    pub async fn shutdown(self) {
        self.db.close().await;
        tracing::debug!("Navigator shut down");
    }

    /// Parse and run one protocol line
    pub async fn command_line(&mut self, line: &str) -> Result<(), NavError> {
        self.dispatch(Command::parse_line(line)).await
    }

    /// Parse and run `verb arg…`
    pub async fn command<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), NavError> {
        self.dispatch(Command::parse(args)).await
    }

    async fn dispatch(&mut self, parsed: Result<Command, NavError>) -> Result<(), NavError> {
        match parsed {
            Ok(command) => self.execute(command).await,
            Err(NavError::Unmapped(line)) => {
                tracing::warn!(command = %line, "Not yet mapped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<(), NavError> {
        let verb = command.verb();
        let result = match command {
            Command::Enable => self.enable().await,
            Command::Disable => self.view.deactivate().map_err(NavError::from),
            Command::ShowMain => self.show_main().await,
            Command::ShowTags => self.show_tags().await,
            Command::Select(id) => self.select(&id).await,
            Command::Back => self.back(),
            Command::NextUnread => self.next_unread().await,
            Command::PrevUnread => self.prev_unread().await,
            Command::NextArticle => self.next_article().await,
            Command::PrevArticle => self.prev_article().await,
            Command::ToggleArticleRead(ToggleTarget::Current) => self.toggle_current().await,
            Command::ToggleArticleRead(ToggleTarget::Urls(urls)) => self.toggle_batch(urls).await,
        };
        match &result {
            Ok(()) => tracing::debug!(
                verb,
                depth = self.stack.len(),
                top = self.stack.top().kind(),
                "Command handled"
            ),
            Err(e) => tracing::debug!(verb, error = %e, "Command failed"),
        }
        result
    }

    fn show_top(&mut self) -> Result<(), NavError> {
        self.view.show(self.stack.top())?;
        Ok(())
    }

    /// Display a freshly pushed page and park the cursor on its first row
    fn show_pushed(&mut self) -> Result<(), NavError> {
        self.show_top()?;
        self.view.reset_cursor(DEFAULT_CURSOR)?;
        Ok(())
    }

    /// Push `page` and display it. The page is popped again if the view fails.
    fn commit_push(&mut self, page: Page) -> Result<(), NavError> {
        self.stack.push(page);
        if let Err(e) = self.show_pushed() {
            self.stack.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Collapse the stack to `menu` and display it. The previous stack comes
    /// back if the view fails.
    fn commit_reset(&mut self, menu: MainMenu) -> Result<(), NavError> {
        let previous = std::mem::replace(&mut self.stack, PageStack::new(menu));
        if let Err(e) = self.show_top() {
            self.stack = previous;
            return Err(e);
        }
        Ok(())
    }

    async fn fresh_main_menu(&self) -> Result<MainMenu, NavError> {
        MainMenu::query(&self.db, self.filters.clone()).await
    }

    // ========================================================================
    // Stack-shaping verbs
    // ========================================================================

    /// A fresh main menu becomes the top and the view is attached.
    ///
    /// History below a main menu is unreachable (`back` stops at any main
    /// menu), so the stack is collapsed rather than grown.
    async fn enable(&mut self) -> Result<(), NavError> {
        let menu = self.fresh_main_menu().await?;
        self.view.activate()?;
        self.commit_reset(menu)
    }

    async fn show_main(&mut self) -> Result<(), NavError> {
        let menu = self.fresh_main_menu().await?;
        self.commit_reset(menu)
    }

    async fn show_tags(&mut self) -> Result<(), NavError> {
        let tags = TagsPage::query(&self.db).await?;
        self.commit_push(Page::Tags(tags))
    }

    fn back(&mut self) -> Result<(), NavError> {
        if matches!(self.stack.top(), Page::MainMenu(_)) {
            return Ok(());
        }
        let Some(popped) = self.stack.pop() else {
            return Ok(());
        };
        if let Err(e) = self.show_top() {
            self.stack.push(popped);
            return Err(e);
        }
        Ok(())
    }

    /// Push the child of the current page named by `id`.
    ///
    /// Opening an article from a feed or filter marks it read. Selecting
    /// anything on an article page does nothing.
    async fn select(&mut self, id: &str) -> Result<(), NavError> {
        let Some(child) = self.stack.top().resolve_child(&self.db, id).await? else {
            return Ok(());
        };
        let child = match child {
            Page::Article(article) => Page::Article(self.open_article(article).await?),
            page => page,
        };
        self.commit_push(child)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::page::Table;
    use crate::storage::fixtures::{insert_article, insert_feed, is_unread};
    use crate::storage::FeedTags;
    use crate::view::Cursor;
    use pretty_assertions::assert_eq;
    use std::io;

    pub(crate) const FEED: &str = "http://example.com/feed";
    pub(crate) const A: &str = "http://example.com/a";
    pub(crate) const B: &str = "http://example.com/b";
    pub(crate) const C: &str = "http://example.com/c";

    /// Records what the navigator asked the host to do
    #[derive(Debug, Default)]
    pub(crate) struct RecordingView {
        pub shown: Vec<(&'static str, Table)>,
        pub cursors: Vec<Cursor>,
        pub active: bool,
        /// Make every `show` fail, as a closed stdout would
        pub broken: bool,
    }

    impl View for RecordingView {
        fn show(&mut self, page: &Page) -> io::Result<()> {
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "host went away"));
            }
            self.shown.push((page.kind(), page.render()));
            Ok(())
        }

        fn reset_cursor(&mut self, cursor: Cursor) -> io::Result<()> {
            self.cursors.push(cursor);
            Ok(())
        }

        fn activate(&mut self) -> io::Result<()> {
            self.active = true;
            Ok(())
        }

        fn deactivate(&mut self) -> io::Result<()> {
            self.active = false;
            Ok(())
        }
    }

    /// Feed with articles A (unread, newest), B (read), C (unread, oldest)
    pub(crate) async fn navigator() -> Navigator<RecordingView> {
        let db = Database::open(":memory:").await.unwrap();
        insert_feed(&db, FEED, "Example").await;
        insert_article(&db, FEED, A, 300, true).await;
        insert_article(&db, FEED, B, 200, false).await;
        insert_article(&db, FEED, C, 100, true).await;
        db.sync_tags(&[FeedTags {
            rss_url: FEED.to_string(),
            tags: vec!["tech".to_string()],
        }])
        .await
        .unwrap();
        let filters = vec![FilterId::new("Unread", "unread = 1", &[])];
        let mut nav = Navigator::new(db, RecordingView::default()).with_filters(filters);
        nav.command(&["enable"]).await.unwrap();
        nav
    }

    pub(crate) fn top_feed(nav: &Navigator<RecordingView>) -> &crate::page::Feed {
        match nav.stack().top() {
            Page::Feed(feed) => feed,
            other => panic!("expected feed on top, got {}", other.kind()),
        }
    }

    pub(crate) fn parent_feed(nav: &Navigator<RecordingView>) -> &crate::page::Feed {
        match nav.stack().parent() {
            Some(Page::Feed(feed)) => feed,
            other => panic!("expected feed below top, got {:?}", other.map(Page::kind)),
        }
    }

    pub(crate) fn top_article_url(nav: &Navigator<RecordingView>) -> &str {
        match nav.stack().top() {
            Page::Article(a) => &a.url,
            other => panic!("expected article on top, got {}", other.kind()),
        }
    }

    pub(crate) fn db(nav: &Navigator<RecordingView>) -> &Database {
        &nav.db
    }

    #[tokio::test]
    async fn test_enable_shows_main_menu() {
        let nav = navigator().await;
        assert!(nav.view().active);
        assert_eq!(nav.stack().len(), 1);
        let (kind, table) = nav.view().shown.last().unwrap();
        assert_eq!(*kind, "MainMenu");
        assert_eq!(table.columns[2], vec!["query:Unread:unread = 1", FEED]);
    }

    #[tokio::test]
    async fn test_disable_keeps_stack() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.command(&["disable"]).await.unwrap();
        assert!(!nav.view().active);
        assert_eq!(nav.stack().len(), 2);
    }

    #[tokio::test]
    async fn test_select_feed_url() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        assert_eq!(nav.stack().len(), 2);
        let feed = top_feed(&nav);
        assert_eq!(feed.rss_url, FEED);
        assert_eq!(feed.unread_count(), 2);
        assert_eq!(nav.view().cursors, vec![DEFAULT_CURSOR]);
    }

    #[tokio::test]
    async fn test_select_without_id_is_invalid() {
        let mut nav = navigator().await;
        let err = nav.command(&["select"]).await.unwrap_err();
        assert!(matches!(err, NavError::InvalidState(_)));
        assert_eq!(nav.stack().len(), 1);
    }

    #[tokio::test]
    async fn test_select_unknown_feed_not_found() {
        let mut nav = navigator().await;
        let err = nav
            .command(&["select", "http://missing.example.com"])
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::NotFound(_)));
        assert_eq!(nav.stack().len(), 1);
        assert!(nav.view().cursors.is_empty());
    }

    #[tokio::test]
    async fn test_select_article_marks_read_everywhere() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.command(&["select", A]).await.unwrap();

        assert_eq!(nav.stack().len(), 3);
        assert_eq!(top_article_url(&nav), A);
        let Page::Article(article) = nav.stack().top() else {
            unreachable!()
        };
        assert!(!article.unread);
        assert!(!is_unread(db(&nav), A).await);
        let feed = parent_feed(&nav);
        assert!(!feed.articles()[0].unread);
        assert_eq!(feed.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_select_on_article_is_no_op() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.command(&["select", A]).await.unwrap();
        let shown = nav.view().shown.len();

        nav.command(&["select", B]).await.unwrap();
        assert_eq!(nav.stack().len(), 3);
        assert_eq!(top_article_url(&nav), A);
        assert_eq!(nav.view().shown.len(), shown);
    }

    #[tokio::test]
    async fn test_select_article_not_in_feed() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        let err = nav
            .command(&["select", "http://example.com/zzz"])
            .await
            .unwrap_err();
        assert!(matches!(err, NavError::NotFound(_)));
        assert_eq!(nav.stack().len(), 2);
    }

    #[tokio::test]
    async fn test_select_filter_then_article() {
        let mut nav = navigator().await;
        nav.command(&["select", "query:Unread:unread = 1"]).await.unwrap();
        let Page::Filter(filter) = nav.stack().top() else {
            panic!("expected filter");
        };
        assert_eq!(filter.id.as_str(), "query:Unread:unread = 1");
        assert_eq!(filter.articles().len(), 2);

        nav.command(&["select", C]).await.unwrap();
        assert_eq!(top_article_url(&nav), C);
        assert!(!is_unread(db(&nav), C).await);
        let Some(Page::Filter(filter)) = nav.stack().parent() else {
            panic!("expected filter below article");
        };
        assert!(!filter.articles()[1].unread);
    }

    #[tokio::test]
    async fn test_tags_flow() {
        let mut nav = navigator().await;
        nav.command(&["show-tags"]).await.unwrap();
        assert!(matches!(nav.stack().top(), Page::Tags(_)));
        nav.command(&["select", "tech"]).await.unwrap();
        assert!(matches!(nav.stack().top(), Page::TagFeeds(t) if t.tag == "tech"));
        nav.command(&["select", FEED]).await.unwrap();
        assert_eq!(top_feed(&nav).rss_url, FEED);
        assert_eq!(nav.stack().len(), 4);
    }

    #[tokio::test]
    async fn test_back_pops_and_stops_at_root() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.command(&["back"]).await.unwrap();
        assert_eq!(nav.stack().len(), 1);
        let shown = nav.view().shown.len();

        nav.command(&["back"]).await.unwrap();
        nav.command(&["back"]).await.unwrap();
        assert_eq!(nav.stack().len(), 1);
        assert!(matches!(nav.stack().top(), Page::MainMenu(_)));
        assert_eq!(nav.view().shown.len(), shown);
    }

    #[tokio::test]
    async fn test_show_main_collapses_history() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.command(&["select", A]).await.unwrap();
        nav.command(&["show-main"]).await.unwrap();
        assert_eq!(nav.stack().len(), 1);
        let Page::MainMenu(menu) = nav.stack().top() else {
            panic!("expected main menu");
        };
        assert_eq!(menu.feeds[0].unread_count, 1);
    }

    #[tokio::test]
    async fn test_unmapped_verb_is_ignored() {
        let mut nav = navigator().await;
        nav.command(&["frobnicate", "x"]).await.unwrap();
        nav.command_line("also-unknown").await.unwrap();
        assert_eq!(nav.stack().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_stack_untouched() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.db.close().await;
        let err = nav.command(&["show-main"]).await.unwrap_err();
        assert!(matches!(err, NavError::Store(_)));
        assert_eq!(nav.stack().len(), 2);
        assert_eq!(top_feed(&nav).rss_url, FEED);
    }

    #[tokio::test]
    async fn test_view_failure_rolls_back_stack_changes() {
        let mut nav = navigator().await;
        nav.command(&["select", FEED]).await.unwrap();
        nav.view_mut().broken = true;

        let err = nav.command(&["select", A]).await.unwrap_err();
        assert!(matches!(err, NavError::View(_)));
        assert_eq!(nav.stack().len(), 2);
        assert_eq!(top_feed(&nav).rss_url, FEED);
        // the store write stands and the container follows it
        assert!(!is_unread(db(&nav), A).await);
        assert!(!top_feed(&nav).articles()[0].unread);

        assert!(nav.command(&["back"]).await.is_err());
        assert_eq!(nav.stack().len(), 2);
        assert!(nav.command(&["show-main"]).await.is_err());
        assert_eq!(nav.stack().len(), 2);
        assert!(nav.command(&["show-tags"]).await.is_err());
        assert_eq!(nav.stack().len(), 2);
        assert_eq!(top_feed(&nav).rss_url, FEED);

        nav.view_mut().broken = false;
        nav.command(&["back"]).await.unwrap();
        assert_eq!(nav.stack().len(), 1);
    }
}
