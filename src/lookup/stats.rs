//! 本文検索の統計

use std::collections::{
    BTreeSet,
    HashSet,
};
use std::fmt;

use serde::Serialize;

use crate::indexer::IndexCounts;

/// 統計に載せる未翻訳サンプルの件数
pub const MISS_SAMPLE_SIZE: usize = 10;

/// 本文検索のヒット・ミス集計
///
/// インデックスのロックを取得した後にのみロックする。
#[derive(Debug, Clone, Default)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    /// ヒットした原文
    used_keys: HashSet<String>,
    /// ミスした原文（サンプル順を安定させるため順序付き）
    missed_keys: BTreeSet<String>,
}

impl LookupStats {
    pub fn record_hit(&mut self, key: &str) {
        self.hits += 1;
        if !self.used_keys.contains(key) {
            self.used_keys.insert(key.to_string());
        }
    }

    pub fn record_miss(&mut self, key: &str) {
        self.misses += 1;
        if !self.missed_keys.contains(key) {
            self.missed_keys.insert(key.to_string());
        }
    }

    #[must_use]
    pub fn unique_matched(&self) -> usize {
        self.used_keys.len()
    }

    #[must_use]
    pub fn unique_missed(&self) -> usize {
        self.missed_keys.len()
    }

    /// 統計のスナップショットを作る
    #[must_use]
    pub fn snapshot(&self, loaded: IndexCounts, reloads: u64) -> EngineStats {
        EngineStats {
            loaded,
            reloads,
            hits: self.hits,
            misses: self.misses,
            unique_matched: self.unique_matched(),
            unique_missed: self.unique_missed(),
            sample_of_misses: self.missed_keys.iter().take(MISS_SAMPLE_SIZE).cloned().collect(),
        }
    }
}

/// `print_stats` が返す統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub loaded: IndexCounts,
    pub reloads: u64,
    pub hits: u64,
    pub misses: u64,
    pub unique_matched: usize,
    pub unique_missed: usize,
    pub sample_of_misses: Vec<String>,
}

impl fmt::Display for EngineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Loaded: {} names, {} contextual names, {} messages, {} labels (reloads: {})",
            self.loaded.names,
            self.loaded.contextual_names,
            self.loaded.messages,
            self.loaded.labels,
            self.reloads,
        )?;
        writeln!(f, "Hits: {}, misses: {}", self.hits, self.misses)?;
        writeln!(f, "Unique matched: {}, unique missed: {}", self.unique_matched, self.unique_missed)?;
        for sample in &self.sample_of_misses {
            writeln!(f, "  missing: {}", crate::input::table::escape(sample))?;
        }
        Ok(())
    }
}
