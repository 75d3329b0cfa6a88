//! Browse a newsboat cache as a stack of pages driven by a text editor.
//!
//! The editor sends commands (`select <url>`, `back`, `next-unread`, …) to a
//! [`Navigator`](nav::Navigator), which queries the database, reshapes its
//! [`PageStack`](stack::PageStack), keeps read flags consistent between the
//! database and the pages in memory, and hands the new top page to a
//! [`View`](view::View).

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod nav;
pub mod page;
pub mod stack;
pub mod storage;
pub mod text;
pub mod urls;
pub mod view;

pub use command::Command;
pub use error::NavError;
pub use nav::Navigator;
