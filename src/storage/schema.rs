use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;

use super::types::DatabaseError;

// ============================================================================
// Database
// ============================================================================

/// Handle to a newsboat cache database.
///
/// Commands are handled one at a time, so the pool holds exactly one
/// connection for the lifetime of the process. The connection never idles
/// out, which also keeps `:memory:` databases alive in tests.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open a database connection and make sure the expected tables exist
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Locked` if another process holds the database
    /// lock past the busy timeout, `DatabaseError::Migration` if the tables
    /// cannot be created, and `DatabaseError::Other` for anything else.
    pub async fn open(path: &str) -> Result<Self, DatabaseError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // newsboat may be reloading in the background; wait for its write lock
        // instead of failing the command immediately.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(DatabaseError::from_sqlx)?
            .pragma("busy_timeout", "5000");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        let db = Self { pool };
        db.migrate().await.map_err(|e| match DatabaseError::from_sqlx(e) {
            DatabaseError::Locked => DatabaseError::Locked,
            other => DatabaseError::Migration(other.to_string()),
        })?;
        tracing::debug!(path = %path, "Opened newsboat database");
        Ok(db)
    }

    /// Close the connection. Pending statements finish first.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Create the newsboat tables when they are missing, plus the tag table.
    ///
    /// The `rss_feed`/`rss_item` definitions match newsboat's own cache
    /// schema so a database created here stays readable by newsboat.
    /// Everything uses `IF NOT EXISTS`; an existing cache is left untouched.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rss_feed (
                rssurl VARCHAR(1024) PRIMARY KEY NOT NULL,
                url VARCHAR(1024) NOT NULL,
                title VARCHAR(1024) NOT NULL,
                lastmodified INTEGER(11) NOT NULL DEFAULT 0,
                is_rtl INTEGER(1) NOT NULL DEFAULT 0,
                etag VARCHAR(128) NOT NULL DEFAULT ''
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rss_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                guid VARCHAR(64) NOT NULL,
                title VARCHAR(1024) NOT NULL,
                author VARCHAR(1024) NOT NULL,
                url VARCHAR(1024) NOT NULL,
                feedurl VARCHAR(1024) NOT NULL,
                pubDate INTEGER NOT NULL,
                content VARCHAR(65535) NOT NULL,
                unread INTEGER(1) NOT NULL,
                enclosure_url VARCHAR(1024),
                enclosure_type VARCHAR(1024),
                enqueued INTEGER(1) NOT NULL DEFAULT 0,
                flags VARCHAR(52),
                deleted INTEGER(1) NOT NULL DEFAULT 0,
                base VARCHAR(128) NOT NULL DEFAULT '',
                content_mime_type VARCHAR(255) NOT NULL DEFAULT '',
                enclosure_description VARCHAR(1024) NOT NULL DEFAULT '',
                enclosure_description_mime_type VARCHAR(128) NOT NULL DEFAULT ''
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_rssurl ON rss_feed(rssurl)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_guid ON rss_item(guid)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_feedurl ON rss_item(feedurl)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_deleted ON rss_item(deleted)")
            .execute(&mut *tx)
            .await?;

        // Tags live in newsboat's urls file, not in its cache. They are synced
        // here at startup so tag listings can be answered with SQL.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feed_tags (
                feedurl VARCHAR(1024) NOT NULL,
                tag VARCHAR(1024) NOT NULL,
                PRIMARY KEY (feedurl, tag)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_feed_tags_tag ON feed_tags(tag)")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
