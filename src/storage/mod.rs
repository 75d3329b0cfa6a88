//! Access to the newsboat cache database.
//!
//! Only reads and read-flag updates are performed; content acquisition is
//! newsboat's job.

mod articles;
mod feeds;
mod schema;
mod types;

pub use schema::Database;
pub use types::{Article, DatabaseError, FeedSummary, FeedTags};
