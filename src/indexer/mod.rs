//! 翻訳テーブルのインデックス構築

pub mod translation_index;
pub mod types;

pub use translation_index::{
    CONTEXT_SEPARATOR,
    TranslationIndex,
    contextual_key,
};
pub use types::{
    IndexCounts,
    LoadError,
    LoadSummary,
};
