//! インデックスへの問い合わせ
//!
//! 各リゾルバは [`TranslationIndex`](crate::indexer::TranslationIndex) を借用して検索し、
//! 結果を [`Lookup`] で返す。ミスログへの書き込みは呼び出し側がインデックスのロックを
//! 解放してから行う。

pub mod label;
pub mod message;
pub mod miss_log;
pub mod name;
pub mod scene;
pub mod stats;

pub use label::{
    LABEL_SUFFIX_LIMIT,
    find_label,
};
pub use message::{
    MessageLookup,
    find_message,
};
pub use miss_log::MissLog;
pub use name::find_name;
pub use scene::{
    ScenePosition,
    SceneTracker,
};
pub use stats::{
    EngineStats,
    LookupStats,
};

use crate::types::MissKind;

/// 翻訳が見つからなかった原文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    pub kind: MissKind,
    pub text: String,
}

impl Miss {
    #[must_use]
    pub fn new(kind: MissKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// 1 回の検索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// 翻訳あり
    Found(String),
    /// 翻訳なし。ミスログの対象
    Missed(Miss),
    /// 入力が空のため検索していない
    Skipped,
}

impl Lookup {
    #[must_use]
    pub fn translated(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            Self::Missed(_) | Self::Skipped => None,
        }
    }

    #[must_use]
    pub const fn miss(&self) -> Option<&Miss> {
        match self {
            Self::Missed(miss) => Some(miss),
            Self::Found(_) | Self::Skipped => None,
        }
    }
}
