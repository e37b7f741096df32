//! セーブスロット等のラベル検索

use super::{
    Lookup,
    Miss,
};
use crate::indexer::TranslationIndex;
use crate::types::MissKind;

/// `" [n]"` サフィックスを試す上限
pub const LABEL_SUFFIX_LIMIT: u32 = 30;

/// ラベルを検索する
///
/// 完全一致がなければ `"<label> [1]"` から `"<label> [30]"` までを順に試す。
/// ラベルの出力元によって番号付きで登録されていることがあるため。
#[must_use]
pub fn find_label(index: &TranslationIndex, label: &str) -> Lookup {
    if label.is_empty() {
        return Lookup::Skipped;
    }

    if let Some(translated) = index.label(label) {
        return Lookup::Found(translated.to_string());
    }

    for n in 1..=LABEL_SUFFIX_LIMIT {
        if let Some(translated) = index.label(&format!("{label} [{n}]")) {
            tracing::debug!(label, suffix = n, "Label matched with suffix");
            return Lookup::Found(translated.to_string());
        }
    }

    Lookup::Missed(Miss::new(MissKind::Label, label))
}
