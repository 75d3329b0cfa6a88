//! Parsing of host commands and verb completion.

use crate::error::NavError;

/// Every verb the navigator understands, in the order completion lists them
pub const VERBS: [&str; 11] = [
    "enable",
    "disable",
    "show-main",
    "show-tags",
    "select",
    "back",
    "next-unread",
    "prev-unread",
    "next-article",
    "prev-article",
    "toggle-article-read",
];

/// Argument the host sends to toggle the article currently displayed.
///
/// Only its first position counts; anything after it is ignored.
pub const CURRENT_ARTICLE: &str = "Article";

/// What `toggle-article-read` applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleTarget {
    /// The article on top of the stack
    Current,
    /// Rows selected in a list view
    Urls(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    ShowMain,
    ShowTags,
    Select(String),
    Back,
    NextUnread,
    PrevUnread,
    NextArticle,
    PrevArticle,
    ToggleArticleRead(ToggleTarget),
}

impl Command {
    /// Split a protocol line with shell quoting rules and parse it
    pub fn parse_line(line: &str) -> Result<Self, NavError> {
        let args = shell_words::split(line)
            .map_err(|e| NavError::invalid(format!("Could not split command line: {e}")))?;
        Self::parse(&args)
    }

    /// Parse `verb arg…`.
    ///
    /// Unknown verbs yield [`NavError::Unmapped`], which the navigator logs
    /// and ignores.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, NavError> {
        let Some((verb, rest)) = args.split_first() else {
            return Err(NavError::invalid("No command given."));
        };
        let rest: Vec<&str> = rest.iter().map(AsRef::as_ref).collect();

        let command = match verb.as_ref() {
            "enable" => Command::Enable,
            "disable" => Command::Disable,
            "show-main" => Command::ShowMain,
            "show-tags" => Command::ShowTags,
            "select" => {
                if rest.is_empty() {
                    return Err(NavError::invalid("No arguments for select command."));
                }
                // A host that does not quote ids splits filter ids at spaces.
                Command::Select(rest.join(" "))
            }
            "back" => Command::Back,
            "next-unread" => Command::NextUnread,
            "prev-unread" => Command::PrevUnread,
            "next-article" => Command::NextArticle,
            "prev-article" => Command::PrevArticle,
            "toggle-article-read" => match rest.as_slice() {
                [] | [CURRENT_ARTICLE, ..] => Command::ToggleArticleRead(ToggleTarget::Current),
                urls => Command::ToggleArticleRead(ToggleTarget::Urls(
                    urls.iter().map(|u| u.to_string()).collect(),
                )),
            },
            _ => {
                let line: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
                return Err(NavError::Unmapped(line.join(" ")));
            }
        };
        Ok(command)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::Enable => "enable",
            Command::Disable => "disable",
            Command::ShowMain => "show-main",
            Command::ShowTags => "show-tags",
            Command::Select(_) => "select",
            Command::Back => "back",
            Command::NextUnread => "next-unread",
            Command::PrevUnread => "prev-unread",
            Command::NextArticle => "next-article",
            Command::PrevArticle => "prev-article",
            Command::ToggleArticleRead(_) => "toggle-article-read",
        }
    }
}

/// Verbs starting with `prefix` (case-sensitive); all verbs for an empty prefix
pub fn complete(prefix: &str) -> Vec<&'static str> {
    VERBS
        .iter()
        .copied()
        .filter(|verb| verb.starts_with(prefix))
        .collect()
}
