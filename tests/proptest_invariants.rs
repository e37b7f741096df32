//! Property-based invariant tests for the translation engine.
//!
//! 1. Parsing the same table twice yields identical indexes
//! 2. Shift-JIS round trip through the universal encoding is lossless
//! 3. Contextual names take precedence over global names
//! 4. Label suffix fallback is bounded at 30
//! 5. Word wrap never splits a double-byte pair and never removes bytes
//! 6. A missing key is logged at most once
//! 7. Nearest label is the last label at or before the position
//! 8. Nearest label lookup stays fast for realistic label counts

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::{
    Duration,
    Instant,
};

use proptest::prelude::*;
use retouch_tl::encoding::{
    self,
    is_lead_byte,
};
use retouch_tl::indexer::TranslationIndex;
use retouch_tl::input::source::FsTableSource;
use retouch_tl::lookup::{
    self,
    Miss,
    MissLog,
};
use retouch_tl::types::MissKind;
use retouch_tl::wrap::wrap;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────

/// Characters representable in Shift-JIS, without tab, newline or backslash.
fn sjis_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        Just(' '),
        prop::char::range('ぁ', 'ん'),
        prop::char::range('ァ', 'ヶ'),
        prop::sample::select(vec!['漢', '字', '太', '郎', '花', '子', '章', '、', '。', '！', '？', '─']),
    ]
}

fn sjis_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(sjis_char(), 1..max).prop_map(|chars| chars.into_iter().collect())
}

/// Like [`sjis_text`] but without spaces, so trimming never changes the value.
fn sjis_word(max: usize) -> impl Strategy<Value = String> {
    sjis_text(max).prop_map(|text| text.replace(' ', "_"))
}

fn load_table(dir: &Path, table: &str) -> TranslationIndex {
    let path = dir.join("translation.tsv");
    fs::write(&path, table).unwrap();
    TranslationIndex::load(&FsTableSource, &path, None).unwrap().0
}

/// Linear reference for the nearest label.
fn reference_nearest(labels: &[(i32, String)], index: i32) -> Option<&str> {
    let mut best: Option<&(i32, String)> = None;
    for entry in labels {
        if entry.0 <= index && best.is_none_or(|current| entry.0 > current.0) {
            best = Some(entry);
        }
    }
    best.map(|(_, label)| label.as_str())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Idempotent parse
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn loading_twice_yields_identical_index(
        rows in prop::collection::vec((0..5i32, 0..50i32, 0..4usize, sjis_text(8), sjis_text(8)), 0..40),
    ) {
        let kinds = ["NAME", "TEXT", "LABEL", "CHOICE_0_1"];
        let mut table = String::new();
        for (file, index, kind, original, translated) in &rows {
            writeln!(table, "f{file}\t{index}\t{}\t{original}\t{translated}", kinds[*kind]).unwrap();
        }
        let temp_dir = TempDir::new().unwrap();

        let first = load_table(temp_dir.path(), &table);
        let second = load_table(temp_dir.path(), &table);

        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Encoding round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn legacy_round_trip_is_lossless(text in sjis_text(64)) {
        let legacy = encoding::to_legacy(&text);

        prop_assert_eq!(encoding::to_legacy(&encoding::to_universal(&legacy)), legacy);
        prop_assert_eq!(encoding::to_universal(&encoding::to_legacy(&text)), text);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Contextual precedence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn contextual_name_wins_over_global(
        name in sjis_word(6),
        message in sjis_word(12),
        contextual in sjis_word(6),
        global in sjis_word(6),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let table = format!("f1\t1\tNAME\t{name}\t{contextual}\nf1\t1\tTEXT\t{message}\tx\n");
        let names = temp_dir.path().join("unique_names.tsv");
        fs::write(&names, format!("{name}\t{global}\n")).unwrap();
        let path = temp_dir.path().join("translation.tsv");
        fs::write(&path, table).unwrap();
        let (index, _) = TranslationIndex::load(&FsTableSource, &path, Some(&names)).unwrap();

        let with_context = lookup::find_name(&index, &name, Some(&message));
        let without_context = lookup::find_name(&index, &name, None);

        prop_assert_eq!(with_context.translated(), Some(contextual.as_str()));
        prop_assert_eq!(without_context.translated(), Some(global.as_str()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Label suffix bound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn label_suffix_fallback_is_bounded(label in "[a-z]{1,12}", suffix in 1u32..=60) {
        let temp_dir = TempDir::new().unwrap();
        let index = load_table(temp_dir.path(), &format!("f1\t1\tLABEL\t{label} [{suffix}]\tfound\n"));

        let result = lookup::find_label(&index, &label);

        if suffix <= lookup::LABEL_SUFFIX_LIMIT {
            prop_assert_eq!(result.translated(), Some("found"));
        } else {
            prop_assert_eq!(result.miss(), Some(&Miss::new(MissKind::Label, label.clone())));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Word wrap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrap_keeps_double_byte_pairs_together(text in sjis_text(120), width in 1usize..80) {
        let input = encoding::to_legacy(&text);

        let output = wrap(&input, width);

        prop_assert_eq!(output.len(), input.len());
        // 改行は空白の位置にしか入らない
        for (before, after) in input.iter().zip(&output) {
            prop_assert!(before == after || (*before == b' ' && *after == b'\n'));
        }
        // 先頭から辿って、全角の先行バイトの直後が改行になっていない
        let mut i = 0;
        while i < output.len() {
            if is_lead_byte(output[i]) {
                prop_assert!(output.get(i + 1).is_none_or(|&trail| trail != b'\n'));
                i += 2;
            } else {
                i += 1;
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Miss log deduplication
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn missing_key_is_logged_once(text in sjis_text(16), queries in 1usize..10) {
        let temp_dir = TempDir::new().unwrap();
        let log = MissLog::new(true, temp_dir.path().join("untranslated.tsv"));

        let written = (0..queries).filter(|_| log.record(&Miss::new(MissKind::Text, text.clone()))).count();

        let content = fs::read_to_string(log.path()).unwrap();
        prop_assert_eq!(written, 1);
        prop_assert_eq!(content.matches("\r\n").count(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Nearest label correctness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nearest_label_matches_reference(
        positions in prop::collection::btree_set(0..500i32, 0..30),
        query in -10..520i32,
    ) {
        let labels: Vec<(i32, String)> = positions.iter().map(|&p| (p, format!("L{p}"))).collect();
        let mut table = String::new();
        for (position, label) in &labels {
            writeln!(table, "f1\t{position}\tLABEL\t{label}\t{label}").unwrap();
        }
        let temp_dir = TempDir::new().unwrap();
        let index = load_table(temp_dir.path(), &table);

        prop_assert_eq!(index.nearest_label("f1", query), reference_nearest(&labels, query));
        prop_assert_eq!(index.nearest_label("f2", query), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Nearest label performance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn nearest_label_scan_is_fast(label_count in 1usize..500) {
        let mut table = String::new();
        for i in 0..label_count {
            writeln!(table, "f1\t{}\tLABEL\tL{i}\tL{i}", i * 10).unwrap();
        }
        let temp_dir = TempDir::new().unwrap();
        let index = load_table(temp_dir.path(), &table);

        let started = Instant::now();
        for query in 0..10_000 {
            let _ = index.nearest_label("f1", query);
        }

        // 1 万回の検索が 1 秒以内（1 回あたり 100 µs 未満）
        prop_assert!(started.elapsed() < Duration::from_secs(1));
    }
}
