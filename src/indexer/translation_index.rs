//! 翻訳テーブルからルックアップ用インデックスを構築する
//!
//! 構築は 2 段階:
//! 1. グローバル名前テーブルを `names` に読み込む
//! 2. メインテーブルを読み、`NAME` 行を位置ごとにバッファして、
//!    同じ位置の `TEXT`/`MSG` 行があれば文脈付き名前、なければ `names` の上書きにする
//!
//! 同じキーが複数回現れた場合は後勝ち。

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::path::Path;

use super::types::{
    IndexCounts,
    LoadError,
    LoadSummary,
};
use crate::encoding::{
    self,
    TableEncoding,
};
use crate::input::source::TableSource;
use crate::input::table::{
    self,
    NameRecord,
    TableRecord,
};
use crate::types::TablePosition;

/// 文脈付き名前キーの区切り文字
pub const CONTEXT_SEPARATOR: char = '|';

/// 文脈付き名前のキー（`名前|本文`）を作る
#[must_use]
pub fn contextual_key(name: &str, message: &str) -> String {
    let mut key = String::with_capacity(name.len() + message.len() + 1);
    key.push_str(name);
    key.push(CONTEXT_SEPARATOR);
    key.push_str(message);
    key
}

/// ルックアップ用のマップ一式
///
/// 再読み込みでは常に新しいインデックスを丸ごと作り直す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationIndex {
    /// `名前|本文` → 翻訳名
    contextual_names: HashMap<String, String>,
    /// 名前 → 翻訳名（グローバル + 上書き）
    names: HashMap<String, String>,
    /// 本文・選択肢 → 翻訳
    messages: HashMap<String, String>,
    /// ラベル → 翻訳
    labels: HashMap<String, String>,
    /// ファイル ID → (インデックス, 表示用ラベル)、インデックス昇順
    labels_by_position: HashMap<String, Vec<(i32, String)>>,
    /// 本文 → テーブル上の位置
    message_positions: HashMap<String, TablePosition>,
}

impl TranslationIndex {
    /// テーブルを読み込んでインデックスを構築する
    ///
    /// メインテーブルが読めなくても、グローバル名前が 1 件以上読めていれば成功とする。
    ///
    /// # Errors
    /// メインテーブルが読めず、グローバル名前も 0 件の場合
    pub fn load(
        source: &dyn TableSource,
        table_path: &Path,
        names_path: Option<&Path>,
    ) -> Result<(Self, LoadSummary), LoadError> {
        let mut builder = IndexBuilder::default();

        if let Some(names_path) = names_path {
            match source.read(names_path) {
                Ok(bytes) => {
                    let content = encoding::decode_table(&bytes, encoding::detect(&bytes));
                    builder.add_global_names(&content);
                }
                Err(error) => {
                    tracing::warn!(path = %names_path.display(), %error, "No global names file");
                }
            }
        }

        match source.read(table_path) {
            Ok(bytes) => {
                let detected = encoding::detect(&bytes);
                let content = encoding::decode_table(&bytes, detected);
                builder.add_table(&content, detected);
            }
            Err(error) => {
                tracing::warn!(path = %table_path.display(), %error, "Cannot open translation table");
                if builder.summary.global_names == 0 {
                    return Err(LoadError::NothingLoaded {
                        table: table_path.to_path_buf(),
                        source: error,
                    });
                }
            }
        }

        let (index, summary) = builder.finish();
        tracing::info!(%summary, "Translation index built");
        Ok((index, summary))
    }

    /// 文脈付き名前を引く
    #[must_use]
    pub fn contextual_name(&self, name: &str, message: &str) -> Option<&str> {
        self.contextual_names.get(&contextual_key(name, message)).map(String::as_str)
    }

    #[must_use]
    pub fn name(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn message(&self, message: &str) -> Option<&str> {
        self.messages.get(message).map(String::as_str)
    }

    #[must_use]
    pub fn label(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    #[must_use]
    pub fn message_position(&self, message: &str) -> Option<&TablePosition> {
        self.message_positions.get(message)
    }

    /// 指定位置以前で最も近いラベルを返す
    ///
    /// 同じファイルのラベルを線形走査し、`index` 以下で最大のインデックスを持つものを選ぶ。
    /// ファイルあたりのラベル数は少ないので二分探索はしない。
    #[must_use]
    pub fn nearest_label(&self, file_id: &str, index: i32) -> Option<&str> {
        let mut best: Option<&(i32, String)> = None;
        for entry in self.labels_by_position.get(file_id)? {
            if entry.0 <= index && best.is_none_or(|current| entry.0 > current.0) {
                best = Some(entry);
            }
        }
        best.map(|(_, label)| label.as_str())
    }

    #[must_use]
    pub fn counts(&self) -> IndexCounts {
        IndexCounts {
            contextual_names: self.contextual_names.len(),
            names: self.names.len(),
            messages: self.messages.len(),
            labels: self.labels.len(),
        }
    }
}

/// 読み込み中の中間状態
#[derive(Debug, Default)]
struct IndexBuilder {
    index: TranslationIndex,
    summary: LoadSummary,
    /// 2 パス目まで保留する `NAME` 行
    pending_names: BTreeMap<TablePosition, NameRecord>,
    /// 位置 → `TEXT`/`MSG` の原文
    texts_by_position: HashMap<TablePosition, String>,
    labels_by_position: BTreeMap<TablePosition, String>,
}

impl IndexBuilder {
    fn add_global_names(&mut self, content: &str) {
        for (_, line) in table::data_lines(content) {
            let Some(entry) = table::parse_global_name(line) else {
                continue;
            };
            self.index.names.insert(entry.original, entry.translated);
            self.summary.global_names += 1;
        }
    }

    fn add_table(&mut self, content: &str, detected: TableEncoding) {
        self.summary.encoding = Some(detected);

        for (line_number, line) in table::data_lines(content) {
            let record = match table::parse_record(line) {
                Ok(record) => record,
                Err(reason) => {
                    tracing::debug!(line_number, %reason, "Skipping table line");
                    self.summary.skipped += 1;
                    continue;
                }
            };

            match record {
                TableRecord::Name(name) => {
                    self.pending_names.insert(name.position.clone(), name);
                }
                TableRecord::Text(text) => {
                    if text.kind.is_dialogue() {
                        self.texts_by_position.insert(text.position.clone(), text.original.clone());
                        self.index
                            .message_positions
                            .insert(text.original.clone(), text.position);
                        self.summary.texts += 1;
                    } else {
                        self.summary.choices += 1;
                    }
                    self.index.messages.insert(text.original, text.translated);
                }
                TableRecord::Label(label) => {
                    self.labels_by_position.insert(label.position, label.translated.clone());
                    self.index.labels.insert(label.original, label.translated);
                    self.summary.labels += 1;
                }
            }
        }
    }

    fn finish(mut self) -> (TranslationIndex, LoadSummary) {
        for (position, name) in std::mem::take(&mut self.pending_names) {
            if let Some(message) = self.texts_by_position.get(&position) {
                self.index
                    .contextual_names
                    .insert(contextual_key(&name.original, message), name.translated);
                self.summary.contextual_names += 1;
            } else {
                self.index.names.insert(name.original, name.translated);
                self.summary.name_overrides += 1;
            }
        }

        for (position, label) in self.labels_by_position {
            self.index
                .labels_by_position
                .entry(position.file_id)
                .or_default()
                .push((position.index, label));
        }

        (self.index, self.summary)
    }
}
