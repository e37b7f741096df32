//! retouch-tl
//!
//! Retouch エンジンのビジュアルノベル向けランタイム翻訳エンジン。
//! フックされたテキスト表示呼び出しの原文を翻訳テーブルで置き換える。

pub mod asset;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod indexer;
pub mod input;
pub mod interned;
pub mod lookup;
pub mod types;
pub mod watch;
pub mod wrap;

#[cfg(test)]
mod test_utils;

// Engine を再エクスポート
pub use engine::{
    Dialogue,
    Engine,
};
pub use interned::InternedStr;
