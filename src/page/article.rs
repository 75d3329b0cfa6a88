use chrono::DateTime;

use super::Table;
use crate::storage::Article;
use crate::text;

/// List marker for an article row
pub fn prefix(article: &Article) -> &'static str {
    if article.unread {
        "N"
    } else {
        " "
    }
}

/// `YYYY-MM-DD` in UTC; empty for timestamps chrono cannot represent
pub fn date(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Header fields, a blank separator line, then the body
pub fn render(article: &Article) -> Table {
    let mut lines = vec![
        format!("Feed: {}", article.feed_url),
        format!("Title: {}", text::cell(&article.title)),
        format!("Author: {}", text::cell(&article.author)),
        format!("Date: {}", date_time(article.pub_date)),
        format!("Link: {}", article.url),
        String::new(),
    ];
    lines.extend(
        text::strip_control_chars(&article.content)
            .lines()
            .map(str::to_string),
    );
    Table {
        columns: vec![lines],
    }
}
