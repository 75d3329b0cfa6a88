use super::schema::Database;
use super::types::{DatabaseError, FeedSummary, FeedSummaryRow, FeedTags};

/// Shared projection for feed listings. Soft-deleted items are not counted.
const FEED_SUMMARY_SELECT: &str = r#"
    SELECT
        f.rssurl AS rss_url,
        f.title AS title,
        COUNT(CASE WHEN i.unread = 1 THEN 1 END) AS unread_count,
        COUNT(i.id) AS article_count
    FROM rss_feed f
    LEFT JOIN rss_item i ON i.feedurl = f.rssurl AND i.deleted = 0
"#;

impl Database {
    // ========================================================================
    // Feed Queries
    // ========================================================================

    /// All feeds with their unread/total counts, ordered by title
    pub async fn get_main_feeds(&self) -> Result<Vec<FeedSummary>, DatabaseError> {
        let sql = format!(
            "{FEED_SUMMARY_SELECT} GROUP BY f.rssurl ORDER BY f.title COLLATE NOCASE, f.rssurl"
        );
        let rows: Vec<FeedSummaryRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(FeedSummary::from).collect())
    }

    /// One feed by its exact rss url, or `None` if it is not subscribed
    pub async fn get_feed(&self, rss_url: &str) -> Result<Option<FeedSummary>, DatabaseError> {
        let sql = format!("{FEED_SUMMARY_SELECT} WHERE f.rssurl = ? GROUP BY f.rssurl");
        let row: Option<FeedSummaryRow> = sqlx::query_as(&sql)
            .bind(rss_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(FeedSummary::from))
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Every known tag, alphabetically
    pub async fn get_tags(&self) -> Result<Vec<String>, DatabaseError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT tag FROM feed_tags ORDER BY tag")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(tag,)| tag).collect())
    }

    /// Feeds carrying `tag`. Feeds tagged in the urls file but absent from the
    /// cache (never reloaded) are not listed.
    pub async fn get_tag_feeds(&self, tag: &str) -> Result<Vec<FeedSummary>, DatabaseError> {
        let sql = format!(
            "{FEED_SUMMARY_SELECT}
            WHERE f.rssurl IN (SELECT feedurl FROM feed_tags WHERE tag = ?)
            GROUP BY f.rssurl ORDER BY f.title COLLATE NOCASE, f.rssurl"
        );
        let rows: Vec<FeedSummaryRow> = sqlx::query_as(&sql)
            .bind(tag)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FeedSummary::from).collect())
    }

    /// Replace the stored tag assignments with `feeds` in one transaction.
    ///
    /// The urls file is the source of truth, so tags that disappeared from it
    /// are dropped.
    pub async fn sync_tags(&self, feeds: &[FeedTags]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM feed_tags").execute(&mut *tx).await?;
        for feed in feeds {
            for tag in &feed.tags {
                sqlx::query("INSERT OR IGNORE INTO feed_tags (feedurl, tag) VALUES (?, ?)")
                    .bind(&feed.rss_url)
                    .bind(tag)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        tx.commit().await?;
        tracing::debug!(feeds = feeds.len(), "Synced feed tags");
        Ok(())
    }
}
