//! Core types used throughout the project.

use std::fmt;

/// 翻訳テーブル内の位置（ソースファイル ID + 行インデックス）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TablePosition {
    pub file_id: String,
    pub index: i32,
}

impl TablePosition {
    #[must_use]
    pub fn new(file_id: impl Into<String>, index: i32) -> Self {
        Self { file_id: file_id.into(), index }
    }
}

impl fmt::Display for TablePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_id, self.index)
    }
}

/// Kind column of a main-table record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Name,
    Text,
    Msg,
    Label,
    /// `CHOICE_<question>_<n>`; the full column value is kept.
    Choice(String),
}

impl RecordKind {
    /// Parses the kind column. Unknown kinds return `None`.
    #[must_use]
    pub fn parse(column: &str) -> Option<Self> {
        match column {
            "NAME" => Some(Self::Name),
            "TEXT" => Some(Self::Text),
            "MSG" => Some(Self::Msg),
            "LABEL" => Some(Self::Label),
            other if other.starts_with("CHOICE_") => Some(Self::Choice(other.to_string())),
            _ => None,
        }
    }

    /// TEXT / MSG records carry a position used for contextual names and scenes.
    #[must_use]
    pub const fn is_dialogue(&self) -> bool {
        matches!(self, Self::Text | Self::Msg)
    }
}

/// Category written to the missed-translation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissKind {
    Name,
    Text,
    Label,
}

impl MissKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Text => "TEXT",
            Self::Label => "LABEL",
        }
    }
}

impl fmt::Display for MissKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
