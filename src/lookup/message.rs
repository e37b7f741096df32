//! 本文・選択肢の検索

use super::{
    Lookup,
    LookupStats,
    Miss,
    ScenePosition,
};
use crate::indexer::TranslationIndex;
use crate::types::MissKind;

/// 本文検索の結果とヒット位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLookup {
    pub result: Lookup,
    /// ヒットした本文がテーブル上の位置を持つ場合のシーン位置
    pub scene: Option<ScenePosition>,
}

/// 本文を検索し、統計を更新する
///
/// `stats` はインデックスのロックを保持したまま渡すこと。
#[must_use]
pub fn find_message(index: &TranslationIndex, stats: &mut LookupStats, message: &str) -> MessageLookup {
    if message.is_empty() {
        return MessageLookup { result: Lookup::Skipped, scene: None };
    }

    let Some(translated) = index.message(message) else {
        stats.record_miss(message);
        tracing::debug!(message, "Message not found");
        return MessageLookup {
            result: Lookup::Missed(Miss::new(MissKind::Text, message)),
            scene: None,
        };
    };

    stats.record_hit(message);
    let scene = index.message_position(message).map(|position| {
        let label = index.nearest_label(&position.file_id, position.index).map(str::to_string);
        ScenePosition::new(position.file_id.clone(), label)
    });

    MessageLookup { result: Lookup::Found(translated.to_string()), scene }
}
