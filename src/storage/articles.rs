use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::{Article, ArticleDbRow, DatabaseError};

/// Maximum number of articles to return from any single query (OOM protection)
const MAX_ARTICLES: i64 = 2000;

/// Column projection matching `ArticleDbRow`
const ARTICLE_COLUMNS: &str =
    "url, title, author, feedurl AS feed_url, pubDate AS pub_date, content, unread";

impl Database {
    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Articles of one feed, newest first. Soft-deleted items are skipped.
    pub async fn get_articles_for_feed(&self, rss_url: &str) -> Result<Vec<Article>, DatabaseError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM rss_item
             WHERE feedurl = ? AND deleted = 0
             ORDER BY pubDate DESC, id DESC
             LIMIT ?"
        );
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(rss_url)
            .bind(MAX_ARTICLES)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// A single article by exact url.
    ///
    /// newsboat can hold the same link under several feeds; the most recent
    /// item wins.
    pub async fn get_article(&self, url: &str) -> Result<Option<Article>, DatabaseError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM rss_item
             WHERE url = ? AND deleted = 0
             ORDER BY pubDate DESC, id DESC
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ArticleDbRow::into_article))
    }

    /// The item with `url` as stored under one feed.
    ///
    /// Unlike [`get_article`](Self::get_article) this never picks up a copy of
    /// the same link from another feed.
    pub async fn get_feed_article(
        &self,
        feed_url: &str,
        url: &str,
    ) -> Result<Option<Article>, DatabaseError> {
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM rss_item
             WHERE feedurl = ? AND url = ? AND deleted = 0
             ORDER BY pubDate DESC, id DESC
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(feed_url)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ArticleDbRow::into_article))
    }

    /// Run a saved filter.
    ///
    /// `query` is a boolean SQL expression over `rss_item` columns supplied by
    /// the user's own configuration; it is wrapped in parentheses and may not
    /// contain a statement separator. An empty query matches every article.
    /// A feed passes the tag test when it carries any of `include_tags` (if
    /// non-empty) and none of `exclude_tags`.
    pub async fn run_filter(
        &self,
        query: &str,
        include_tags: &[String],
        exclude_tags: &[String],
    ) -> Result<Vec<Article>, DatabaseError> {
        if query.contains(';') {
            return Err(DatabaseError::InvalidFilter(format!(
                "'{query}' contains a statement separator"
            )));
        }
        let query = query.trim();

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM rss_item WHERE deleted = 0"
        ));
        if !query.is_empty() {
            builder.push(format!(" AND ({query})"));
        }
        if !include_tags.is_empty() {
            builder.push(" AND feedurl IN (SELECT feedurl FROM feed_tags WHERE tag IN (");
            let mut separated = builder.separated(", ");
            for tag in include_tags {
                separated.push_bind(tag.as_str());
            }
            separated.push_unseparated("))");
        }
        if !exclude_tags.is_empty() {
            builder.push(" AND feedurl NOT IN (SELECT feedurl FROM feed_tags WHERE tag IN (");
            let mut separated = builder.separated(", ");
            for tag in exclude_tags {
                separated.push_bind(tag.as_str());
            }
            separated.push_unseparated("))");
        }
        builder.push(" ORDER BY pubDate DESC, id DESC LIMIT ");
        builder.push_bind(MAX_ARTICLES);

        tracing::debug!(
            query = %query,
            include = include_tags.len(),
            exclude = exclude_tags.len(),
            "Running filter"
        );
        let rows: Vec<ArticleDbRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    // ========================================================================
    // Read State
    // ========================================================================

    /// Mark every item with one of `urls` as read, returns rows changed
    pub async fn set_read(&self, urls: &[String]) -> Result<u64, DatabaseError> {
        self.set_unread_flag(urls, false).await
    }

    /// Mark every item with one of `urls` as unread, returns rows changed
    pub async fn set_unread(&self, urls: &[String]) -> Result<u64, DatabaseError> {
        self.set_unread_flag(urls, true).await
    }

    async fn set_unread_flag(&self, urls: &[String], unread: bool) -> Result<u64, DatabaseError> {
        if urls.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("UPDATE rss_item SET unread = ");
        builder.push_bind(unread);
        builder.push(" WHERE url IN (");
        let mut separated = builder.separated(", ");
        for url in urls {
            separated.push_bind(url.as_str());
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Whether any (non-deleted) item with one of `urls` is unread
    pub async fn any_unread(&self, urls: &[String]) -> Result<bool, DatabaseError> {
        if urls.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
            "SELECT EXISTS(SELECT 1 FROM rss_item WHERE unread = 1 AND deleted = 0 AND url IN (",
        );
        let mut separated = builder.separated(", ");
        for url in urls {
            separated.push_bind(url.as_str());
        }
        separated.push_unseparated("))");

        let (exists,): (bool,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(exists)
    }
}
