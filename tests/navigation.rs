//! End-to-end navigation over a newsboat cache file.
//!
//! Each test seeds its own database file in a temp dir the way newsboat
//! would populate it, then drives a `Navigator` through the same line
//! protocol the editor plugin uses.

use pretty_assertions::assert_eq;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

use skiff::page::{FilterId, Page};
use skiff::storage::{Database, FeedTags};
use skiff::view::{JsonView, Notifier};
use skiff::{NavError, Navigator};

const RUST: &str = "https://blog.rust-lang.org/feed.xml";
const LWN: &str = "https://lwn.net/headlines/rss";

struct Fixture {
    _dir: TempDir,
    path: String,
}

impl Fixture {
    /// Two feeds: rust (2 unread of 3, one more soft-deleted) and lwn (all read)
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db").to_str().unwrap().to_string();

        // creates the newsboat schema
        Database::open(&path).await.unwrap().close().await;

        let pool = SqlitePool::connect(&format!("sqlite:{path}")).await.unwrap();
        for (url, title) in [(RUST, "Rust Blog"), (LWN, "LWN.net")] {
            sqlx::query("INSERT INTO rss_feed (rssurl, url, title) VALUES (?, ?, ?)")
                .bind(url)
                .bind(url)
                .bind(title)
                .execute(&pool)
                .await
                .unwrap();
        }
        let items = [
            (RUST, "https://blog.rust-lang.org/1.80", "Rust 1.80", 300, true, false),
            (RUST, "https://blog.rust-lang.org/survey", "Survey", 200, false, false),
            (RUST, "https://blog.rust-lang.org/1.79", "Rust 1.79", 100, true, false),
            (RUST, "https://blog.rust-lang.org/gone", "Gone", 400, true, true),
            (LWN, "https://lwn.net/Articles/1", "Kernel news", 250, false, false),
        ];
        for (feed, url, title, date, unread, deleted) in items {
            sqlx::query(
                r#"INSERT INTO rss_item (guid, title, author, url, feedurl, pubDate, content, unread, deleted)
                   VALUES (?, ?, 'someone', ?, ?, ?, 'text', ?, ?)"#,
            )
            .bind(url)
            .bind(title)
            .bind(url)
            .bind(feed)
            .bind(date)
            .bind(unread)
            .bind(deleted)
            .execute(&pool)
            .await
            .unwrap();
        }
        pool.close().await;

        Self { _dir: dir, path }
    }

    async fn navigator(&self) -> Navigator<JsonView<Vec<u8>>> {
        let db = Database::open(&self.path).await.unwrap();
        db.sync_tags(&[
            FeedTags {
                rss_url: RUST.to_string(),
                tags: vec!["lang".to_string(), "news".to_string()],
            },
            FeedTags {
                rss_url: LWN.to_string(),
                tags: vec!["news".to_string()],
            },
        ])
        .await
        .unwrap();
        let filters = vec![
            FilterId::new("Unread", "unread = 1", &[]),
            FilterId::new("Not Rust", "", &["!lang".to_string()]),
        ];
        Navigator::new(db, JsonView::new(Vec::new())).with_filters(filters)
    }

    async fn unread(&self, url: &str) -> bool {
        let pool = SqlitePool::connect(&format!("sqlite:{}", self.path))
            .await
            .unwrap();
        let (unread,): (bool,) = sqlx::query_as("SELECT unread FROM rss_item WHERE url = ?")
            .bind(url)
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
        unread
    }
}

fn messages(nav: &Navigator<JsonView<Vec<u8>>>) -> Vec<Value> {
    std::str::from_utf8(nav.view().get_ref())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn last_page(nav: &Navigator<JsonView<Vec<u8>>>) -> Value {
    messages(nav)
        .into_iter()
        .rev()
        .find(|m| m["type"] == "page")
        .unwrap()
}

fn top_url(nav: &Navigator<JsonView<Vec<u8>>>) -> String {
    match nav.stack().top() {
        Page::Article(a) => a.url.clone(),
        other => panic!("expected article, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_enable_renders_main_menu() {
    let fixture = Fixture::new().await;
    let mut nav = fixture.navigator().await;
    nav.command_line("enable").await.unwrap();

    let msgs = messages(&nav);
    assert_eq!(msgs[0]["type"], "activate");
    let page = last_page(&nav);
    assert_eq!(page["kind"], "MainMenu");
    let columns = &page["table"]["columns"];
    assert_eq!(columns[0], serde_json::json!(["Q", "Q", "  (0/1)", "N (2/3)"]));
    assert_eq!(columns[1][2], "LWN.net");
    assert_eq!(columns[2][3], RUST);
}

#[tokio::test]
async fn test_read_article_and_come_back() {
    let fixture = Fixture::new().await;
    let mut nav = fixture.navigator().await;
    nav.command_line("enable").await.unwrap();
    nav.command_line(&format!("select {RUST}")).await.unwrap();

    let page = last_page(&nav);
    assert_eq!(page["kind"], "Feed");
    assert_eq!(
        page["table"]["columns"][3],
        serde_json::json!(["Rust 1.80", "Survey", "Rust 1.79"])
    );
    assert_eq!(messages(&nav).last().unwrap()["type"], "cursor");

    nav.command_line("select https://blog.rust-lang.org/1.80")
        .await
        .unwrap();
    assert_eq!(last_page(&nav)["kind"], "Article");
    assert!(!fixture.unread("https://blog.rust-lang.org/1.80").await);

    nav.command_line("next-unread").await.unwrap();
    assert_eq!(top_url(&nav), "https://blog.rust-lang.org/1.79");
    assert!(!fixture.unread("https://blog.rust-lang.org/1.79").await);

    nav.command_line("back").await.unwrap();
    nav.command_line("back").await.unwrap();
    let page = last_page(&nav);
    assert_eq!(page["table"]["columns"][0][3], "N (2/3)");
    nav.command_line("show-main").await.unwrap();
    let page = last_page(&nav);
    assert_eq!(page["table"]["columns"][0][3], "  (0/3)");
}

#[tokio::test]
async fn test_single_toggle_round_trip() {
    let fixture = Fixture::new().await;
    let mut nav = fixture.navigator().await;
    nav.command_line("enable").await.unwrap();
    nav.command_line(&format!("select {RUST}")).await.unwrap();
    let before = nav.stack().top().clone();

    nav.command_line("select https://blog.rust-lang.org/survey")
        .await
        .unwrap();
    nav.command_line("toggle-article-read Article").await.unwrap();
    assert!(fixture.unread("https://blog.rust-lang.org/survey").await);

    // reopen and toggle again: back to where we started
    nav.command_line("select https://blog.rust-lang.org/survey")
        .await
        .unwrap();
    nav.command_line("back").await.unwrap();
    assert_eq!(nav.stack().top(), &before);
    assert!(!fixture.unread("https://blog.rust-lang.org/survey").await);
}

#[tokio::test]
async fn test_filters_and_tags() {
    let fixture = Fixture::new().await;
    let mut nav = fixture.navigator().await;
    nav.command_line("enable").await.unwrap();

    nav.command_line(r#"select "query:Not Rust::!lang""#).await.unwrap();
    let Page::Filter(filter) = nav.stack().top() else {
        panic!("expected filter");
    };
    let urls: Vec<&str> = filter.articles().iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["https://lwn.net/Articles/1"]);

    nav.command_line("show-main").await.unwrap();
    nav.command_line("show-tags").await.unwrap();
    assert_eq!(
        last_page(&nav)["table"]["columns"][1],
        serde_json::json!(["lang", "news"])
    );
    nav.command_line("select news").await.unwrap();
    let Page::TagFeeds(tag_feeds) = nav.stack().top() else {
        panic!("expected tag feeds");
    };
    assert_eq!(tag_feeds.feeds.len(), 2);
}

#[tokio::test]
async fn test_batch_toggle_in_filter_and_notifications() {
    let fixture = Fixture::new().await;
    let (tx, mut rx) = tokio::sync::mpsc::channel(4);
    let mut nav = fixture.navigator().await.with_notifier(Notifier::new(tx));
    nav.command_line("enable").await.unwrap();
    nav.command_line("select query:Unread:unread = 1").await.unwrap();

    nav.command_line("toggle-article-read https://blog.rust-lang.org/1.80 https://blog.rust-lang.org/1.79")
        .await
        .unwrap();
    let change = rx.recv().await.unwrap();
    assert!(!change.unread);
    assert_eq!(change.urls.len(), 2);
    assert!(!fixture.unread("https://blog.rust-lang.org/1.79").await);

    let page = last_page(&nav);
    assert_eq!(page["kind"], "Filter");
    assert_eq!(page["table"]["columns"][0], serde_json::json!([" ", " "]));
}

#[tokio::test]
async fn test_errors_leave_state_alone() {
    let fixture = Fixture::new().await;
    let mut nav = fixture.navigator().await;
    nav.command_line("enable").await.unwrap();

    assert!(matches!(
        nav.command_line("select").await,
        Err(NavError::InvalidState(_))
    ));
    assert!(matches!(
        nav.command_line("select https://nowhere.example.com/rss").await,
        Err(NavError::NotFound(_))
    ));
    assert!(matches!(
        nav.command_line("prev-article").await,
        Err(NavError::InvalidState(_))
    ));
    nav.command_line("reload-everything").await.unwrap();
    assert_eq!(nav.stack().len(), 1);

    nav.command_line(&format!("select {LWN}")).await.unwrap();
    nav.command_line("select https://lwn.net/Articles/1").await.unwrap();
    let err = nav.command_line("next-article").await.unwrap_err();
    assert_eq!(err.to_string(), "Already the last article");
    assert_eq!(nav.stack().len(), 3);
    assert_eq!(top_url(&nav), "https://lwn.net/Articles/1");

    nav.shutdown().await;
}
