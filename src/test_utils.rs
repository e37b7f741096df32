//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Mutex,
    PoisonError,
};

use crate::config::ConfigManager;
use crate::encoding;
use crate::indexer::TranslationIndex;
use crate::input::source::TableSource;

/// メモリ上のテーブルを返す `TableSource`
///
/// エンジン生成後に内容を差し替えて再読み込みを試せる。
#[derive(Debug, Default)]
pub(crate) struct MemoryTableSource {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryTableSource {
    pub(crate) fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).insert(path.into(), bytes.into());
    }

    pub(crate) fn remove(&self, path: &Path) {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).remove(path);
    }
}

impl TableSource for MemoryTableSource {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// UTF-8 のテーブル文字列からインデックスを作る
///
/// # Arguments
/// * `table` - メインテーブルの内容
/// * `names` - グローバル名前テーブルの内容（なければ `None`）
pub(crate) fn build_index(table: &str, names: Option<&str>) -> TranslationIndex {
    let source = MemoryTableSource::default();
    source.insert("translation.tsv", table);
    if let Some(names) = names {
        source.insert("unique_names.tsv", names);
    }

    TranslationIndex::load(&source, Path::new("translation.tsv"), Some(Path::new("unique_names.tsv")))
        .expect("test table should load")
        .0
}

/// ホストが渡すのと同じ Shift-JIS バイト列を作る
pub(crate) fn sjis(text: &str) -> Vec<u8> {
    encoding::to_legacy(text)
}

/// `/game` をゲームディレクトリとする設定
pub(crate) fn game_config() -> ConfigManager {
    ConfigManager::new(PathBuf::from("/game"))
}
