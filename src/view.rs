//! The host editor side of the navigator.
//!
//! The navigator never formats buffers itself. After every command it hands
//! the new top page to a [`View`], which for the stdio binary is a
//! [`JsonView`] emitting one JSON object per line.

use serde::Serialize;
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::page::{Page, Table};

/// Cursor position in the host window (1-based row, 0-based column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

/// Where the cursor goes after a new page is pushed
pub const DEFAULT_CURSOR: Cursor = Cursor { row: 1, col: 0 };

pub trait View {
    /// Display `page`
    fn show(&mut self, page: &Page) -> io::Result<()>;
    fn reset_cursor(&mut self, cursor: Cursor) -> io::Result<()>;
    /// Attach the navigator window
    fn activate(&mut self) -> io::Result<()>;
    /// Detach the navigator window
    fn deactivate(&mut self) -> io::Result<()>;
}

// ============================================================================
// Unread notifications
// ============================================================================

/// Read flags of `urls` were set to `unread` in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadChange {
    pub urls: Vec<String>,
    pub unread: bool,
}

/// Best-effort sender for [`UnreadChange`]s.
///
/// Sending never blocks: with no channel, a full channel or a dropped
/// receiver the change is discarded.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<mpsc::Sender<UnreadChange>>,
}

impl Notifier {
    pub fn new(tx: mpsc::Sender<UnreadChange>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that drops everything
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn notify(&self, change: UnreadChange) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(change) {
            tracing::debug!(error = %e, "Dropped unread notification");
        }
    }
}

// ============================================================================
// JSON line view
// ============================================================================

/// One line of the stdio protocol
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message<'a> {
    Page {
        kind: &'static str,
        table: Table,
    },
    Cursor(Cursor),
    Activate,
    Deactivate,
    Error {
        message: String,
    },
    UnreadChanged(&'a UnreadChange),
    Completion {
        verbs: Vec<&'static str>,
    },
}

/// Writes protocol messages as JSON lines to any writer
pub struct JsonView<W: Write> {
    out: W,
}

impl<W: Write> JsonView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn send(&mut self, message: &Message<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for JsonView<W> {
    fn show(&mut self, page: &Page) -> io::Result<()> {
        self.send(&Message::Page {
            kind: page.kind(),
            table: page.render(),
        })
    }

    fn reset_cursor(&mut self, cursor: Cursor) -> io::Result<()> {
        self.send(&Message::Cursor(cursor))
    }

    fn activate(&mut self) -> io::Result<()> {
        self.send(&Message::Activate)
    }

    fn deactivate(&mut self) -> io::Result<()> {
        self.send(&Message::Deactivate)
    }
}
