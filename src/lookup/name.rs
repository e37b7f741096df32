//! 名前の検索

use super::{
    Lookup,
    Miss,
};
use crate::indexer::TranslationIndex;
use crate::types::MissKind;

/// 話者名を検索する
///
/// 本文が渡された場合は文脈付き名前を先に引き、なければグローバル名前に落ちる。
#[must_use]
pub fn find_name(index: &TranslationIndex, name: &str, message: Option<&str>) -> Lookup {
    if name.is_empty() {
        return Lookup::Skipped;
    }

    let contextual = message
        .filter(|message| !message.is_empty())
        .and_then(|message| index.contextual_name(name, message));

    match contextual.or_else(|| index.name(name)) {
        Some(translated) => Lookup::Found(translated.to_string()),
        None => {
            tracing::debug!(name, "Name not found");
            Lookup::Missed(Miss::new(MissKind::Name, name))
        }
    }
}
