//! 返却文字列のインターンプール
//!
//! ホストに返す Shift-JIS バイト列はここに保持され、次の [`StringInterner::clear`]
//! まで有効。ハンドルは世代番号を持ち、クリア後の古いハンドルは
//! [`StringInterner::resolve`] で `None` になる。

use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};

/// Interned byte string handle, valid until the pool is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedStr {
    /// 発行時のプール世代
    generation: u64,
    /// プール内の位置
    slot: usize,
}

impl InternedStr {
    /// このハンドルを発行したプールの世代
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Pool {
    /// `clear` のたびに進む
    generation: u64,
    /// 格納順の値
    slots: Vec<Arc<[u8]>>,
    /// 値から位置への逆引き
    lookup: HashMap<Arc<[u8]>, usize>,
}

/// 重複排除付きの文字列プール
#[derive(Debug, Default)]
pub struct StringInterner {
    pool: Mutex<Pool>,
}

impl StringInterner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 値を格納し、ハンドルを返す
    ///
    /// 前回のクリア以降に同じ値が格納されていれば同じハンドルを返す。
    pub fn store(&self, value: &[u8]) -> InternedStr {
        let mut pool = self.lock();
        let generation = pool.generation;
        if let Some(&slot) = pool.lookup.get(value) {
            return InternedStr { generation, slot };
        }

        let stored: Arc<[u8]> = Arc::from(value);
        let slot = pool.slots.len();
        pool.slots.push(Arc::clone(&stored));
        pool.lookup.insert(stored, slot);
        InternedStr { generation, slot }
    }

    /// ハンドルを解決する。別の世代のハンドルなら `None`
    #[must_use]
    pub fn resolve(&self, handle: InternedStr) -> Option<Arc<[u8]>> {
        let pool = self.lock();
        if handle.generation != pool.generation {
            tracing::debug!(
                handle_generation = handle.generation,
                current_generation = pool.generation,
                "Stale interned handle"
            );
            return None;
        }
        pool.slots.get(handle.slot).cloned()
    }

    /// すべての値を破棄し、既存ハンドルを無効化する
    ///
    /// 新しい世代番号を返す。
    pub fn clear(&self) -> u64 {
        let mut pool = self.lock();
        pool.slots.clear();
        pool.lookup.clear();
        pool.generation = pool.generation.wrapping_add(1);
        pool.generation
    }

    /// 現在の世代で格納されている値の数
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// 値が 1 つもないかどうか
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
