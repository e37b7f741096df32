//! 現在のシーン位置の追跡
//!
//! ヒットした本文の位置から直前のラベルを求め、(ファイル, ラベル) が変わったときだけ
//! 表示用文字列を返す。外部のプレゼンス通知はこの文字列を受け取る。

use std::sync::{
    Mutex,
    PoisonError,
};

/// 物語上の現在位置
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenePosition {
    pub file_id: String,
    /// ファイル内で直前にあるラベル（翻訳済み）
    pub label: Option<String>,
}

impl ScenePosition {
    #[must_use]
    pub fn new(file_id: impl Into<String>, label: Option<String>) -> Self {
        Self { file_id: file_id.into(), label }
    }

    /// 表示用文字列。ラベルがなければファイル ID
    #[must_use]
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.file_id)
    }
}

#[derive(Debug, Default)]
pub struct SceneTracker {
    /// 最後に通知した位置
    current: Mutex<Option<ScenePosition>>,
}

impl SceneTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 位置を更新する。変化した場合のみ表示用文字列を返す
    pub fn update(&self, position: ScenePosition) -> Option<String> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref() == Some(&position) {
            return None;
        }

        let shown = position.display().to_string();
        tracing::debug!(file_id = %position.file_id, scene = %shown, "Scene changed");
        *current = Some(position);
        Some(shown)
    }

    #[must_use]
    pub fn current(&self) -> Option<ScenePosition> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// 追跡状態を消す。次の更新は必ず変化として扱われる
    pub fn reset(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
