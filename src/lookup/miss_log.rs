//! 未翻訳ログ
//!
//! 翻訳が見つからなかった原文を 1 行ずつ追記する。同じ原文はプロセス中 1 回だけ書く。
//! 行の形式は `RUNTIME\t0\t<kind>\t<escaped original>\t\r\n`。

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Mutex,
    PoisonError,
};

use super::Miss;
use crate::input::table::escape;

#[derive(Debug)]
pub struct MissLog {
    /// `dumpUntranslated`
    enabled: bool,
    /// 追記先
    path: PathBuf,
    /// 書き込み済みの原文。重複判定の間だけロックする
    seen: Mutex<HashSet<String>>,
}

impl MissLog {
    /// `enabled` が `false` なら `record` は何もしない
    #[must_use]
    pub fn new(enabled: bool, path: PathBuf) -> Self {
        Self { enabled, path, seen: Mutex::new(HashSet::new()) }
    }

    /// 追記先のファイル
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ミスを記録する。新しい原文でファイルに追記した場合 `true`
    ///
    /// 重複判定は原文のみで行い、種別は区別しない。
    pub fn record(&self, miss: &Miss) -> bool {
        if !self.enabled || miss.text.is_empty() {
            return false;
        }

        {
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            if !seen.insert(miss.text.clone()) {
                return false;
            }
        }

        match self.append(&format_line(miss)) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Failed to write untranslated log");
                false
            }
        }
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

fn format_line(miss: &Miss) -> String {
    format!("RUNTIME\t0\t{}\t{}\t\r\n", miss.kind, escape(&miss.text))
}
