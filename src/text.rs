//! Cleaning feed-supplied text before it reaches the editor.
//!
//! Titles, authors and bodies come straight from remote feeds. Escape
//! sequences in them would be interpreted by a terminal editor, and a
//! newline inside a table cell would break the parallel-column layout.

use std::borrow::Cow;

fn is_stripped_control(c: char) -> bool {
    c == '\u{7f}' || (c < ' ' && c != '\t' && c != '\n' && c != '\r')
}

/// Remove ASCII control characters and ANSI escape sequences.
///
/// Strips C0 controls except tab/newline/CR, DEL, CSI sequences
/// (`ESC [` … final byte 0x40-0x7E), OSC sequences (`ESC ]` … BEL or
/// `ESC \`) and bare ESC. Clean input is returned borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            if !is_stripped_control(c) {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\u{07}' {
                        break;
                    }
                    if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Make `s` safe for a single table cell: controls stripped, line breaks and
/// tabs folded into single spaces, surrounding whitespace trimmed.
pub fn cell(s: &str) -> String {
    let clean = strip_control_chars(s);
    let mut out = String::with_capacity(clean.len());
    for part in clean.split(['\n', '\r', '\t']).filter(|p| !p.trim().is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part.trim());
    }
    out
}
