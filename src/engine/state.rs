//! エンジンの共有状態

use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

use crate::indexer::TranslationIndex;
use crate::lookup::LookupStats;

/// ロックで保護されたエンジンの状態
///
/// 検索は最初から最後まで `index` を保持する。再読み込みは新しいインデックスを
/// ロック外で構築し、`index` の下で差し替える。
///
/// # ロック順序
///
/// 複数のロックを同時に取得する場合は、以下の順序を厳守してください：
/// 1. `reload`
/// 2. `index`
/// 3. `stats`
///
/// インターンプールは `index` を保持したまま使ってよい。
/// ミスログとシーン通知は `index` を解放してから使う。
#[derive(Debug, Default)]
pub struct EngineState {
    /// 現在のインデックス
    index: Mutex<TranslationIndex>,
    /// 本文検索の統計
    stats: Mutex<LookupStats>,
    /// 再読み込み同士を直列化する
    reload: Mutex<()>,
}

/// ロックが poison されていても中身を使う。
///
/// 検索中のパニックで翻訳全体を止めないため。
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EngineState {
    #[must_use]
    pub fn new(index: TranslationIndex) -> Self {
        Self { index: Mutex::new(index), ..Self::default() }
    }

    pub fn lock_index(&self) -> MutexGuard<'_, TranslationIndex> {
        lock(&self.index)
    }

    /// `index` と `stats` のロックを一括取得
    ///
    /// ロック順序（`index` → `stats`）を保証します。
    pub fn lock_index_and_stats(&self) -> (MutexGuard<'_, TranslationIndex>, MutexGuard<'_, LookupStats>) {
        let index = lock(&self.index);
        let stats = lock(&self.stats);
        (index, stats)
    }

    /// 再読み込み用のロックを取得
    pub fn lock_reload(&self) -> MutexGuard<'_, ()> {
        lock(&self.reload)
    }
}
