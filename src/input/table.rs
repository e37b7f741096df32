//! Translation table line parsing
//!
//! Main table: `fileId<TAB>index<TAB>kind<TAB>original<TAB>translated`.
//! Global names table: `original<TAB>translated[<TAB>usageCount]`.

use thiserror::Error;

use crate::types::{
    RecordKind,
    TablePosition,
};

/// Header line of the global names table starts with this token.
pub const NAMES_HEADER: &str = "ORIGINAL";

const COMMENT_PREFIX: char = '#';
const MIN_FIELDS: usize = 5;

/// A `NAME` row. Consumed while building the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub position: TablePosition,
    pub original: String,
    pub translated: String,
}

/// A `TEXT`, `MSG` or `CHOICE_*` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub position: TablePosition,
    pub kind: RecordKind,
    pub original: String,
    pub translated: String,
}

/// A `LABEL` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub position: TablePosition,
    pub original: String,
    pub translated: String,
}

/// A row of the global names table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalNameEntry {
    pub original: String,
    pub translated: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRecord {
    Name(NameRecord),
    Text(TextRecord),
    Label(LabelRecord),
}

/// Why a main-table line was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {MIN_FIELDS} fields, found {0}")]
    TooFewFields(usize),
    #[error("translation column is empty")]
    EmptyTranslation,
    #[error("invalid index '{0}'")]
    InvalidIndex(String),
    #[error("unknown kind '{0}'")]
    UnknownKind(String),
}

/// Replaces literal `\n` and `\t` sequences with the control characters.
#[must_use]
pub fn unescape(field: &str) -> String {
    field.replace("\\n", "\n").replace("\\t", "\t")
}

/// Inverse of [`unescape`], used when writing strings back to a table.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('\n', "\\n").replace('\t', "\\t")
}

/// Yields `(line_number, line)` for every non-blank, non-comment line.
///
/// Trailing `\r` is removed. Line numbers are 1-based.
pub fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
}

/// Parses one data line of the main table.
///
/// # Errors
/// Returns the reason the line must be skipped.
pub fn parse_record(line: &str) -> Result<TableRecord, RecordError> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [file_id, index, kind, original, translated, ..] = fields.as_slice() else {
        return Err(RecordError::TooFewFields(fields.len()));
    };
    if translated.is_empty() {
        return Err(RecordError::EmptyTranslation);
    }

    let index: i32 =
        index.trim().parse().map_err(|_| RecordError::InvalidIndex((*index).to_string()))?;
    let kind = RecordKind::parse(kind).ok_or_else(|| RecordError::UnknownKind((*kind).to_string()))?;

    let position = TablePosition::new(*file_id, index);
    let original = unescape(original);
    let translated = unescape(translated);

    Ok(match kind {
        RecordKind::Name => TableRecord::Name(NameRecord { position, original, translated }),
        RecordKind::Label => TableRecord::Label(LabelRecord { position, original, translated }),
        kind @ (RecordKind::Text | RecordKind::Msg | RecordKind::Choice(_)) => {
            TableRecord::Text(TextRecord { position, kind, original, translated })
        }
    })
}

/// Parses one data line of the global names table.
///
/// Returns `None` for the header line, lines without a tab, and rows whose
/// original or translation is empty (not filled in yet).
#[must_use]
pub fn parse_global_name(line: &str) -> Option<GlobalNameEntry> {
    if line.starts_with(NAMES_HEADER) {
        return None;
    }

    let (original, rest) = line.split_once('\t')?;
    // 3 列目は使用回数
    let translated = rest.split_once('\t').map_or(rest, |(value, _count)| value);
    let translated = translated.trim_end_matches([' ', '\t']);

    if original.is_empty() || translated.is_empty() {
        return None;
    }

    Some(GlobalNameEntry { original: unescape(original), translated: unescape(translated) })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a\\nb", "a\nb")]
    #[case("a\\tb", "a\tb")]
    #[case("no escapes", "no escapes")]
    #[case("\\n\\n", "\n\n")]
    fn test_unescape(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape(input), expected);
    }

    #[googletest::test]
    fn escape_is_inverse_of_unescape() {
        let text = "line1\nline2\tcol";
        expect_that!(unescape(&escape(text)), eq(text));
    }

    #[googletest::test]
    fn data_lines_skip_comments_and_blank_lines() {
        let content = "# header\r\n\r\nf1\t1\tTEXT\ta\tb\r\n#│\n  \nlast";

        let lines: Vec<_> = data_lines(content).collect();

        assert_eq!(lines, vec![(3, "f1\t1\tTEXT\ta\tb"), (5, "  "), (6, "last")]);
    }

    #[googletest::test]
    fn parse_text_record() {
        let record = parse_record("f1\t10\tTEXT\tこんにちは\\n元気？\tHello\\nHow are you?").unwrap();

        assert_eq!(
            record,
            TableRecord::Text(TextRecord {
                position: TablePosition::new("f1", 10),
                kind: RecordKind::Text,
                original: "こんにちは\n元気？".to_string(),
                translated: "Hello\nHow are you?".to_string(),
            })
        );
    }

    #[googletest::test]
    fn parse_name_and_label_records() {
        let name = parse_record("f1\t10\tNAME\t太郎\tTaro").unwrap();
        let label = parse_record("f1\t3\tLABEL\t第一章\tChapter 1").unwrap();

        expect_that!(matches!(name, TableRecord::Name(_)), eq(true));
        expect_that!(matches!(label, TableRecord::Label(_)), eq(true));
    }

    #[googletest::test]
    fn parse_choice_record_keeps_kind() {
        let record = parse_record("f2\t7\tCHOICE_0_2\t帰る\tGo home").unwrap();

        let TableRecord::Text(text) = record else {
            panic!("expected a text record");
        };
        assert_eq!(text.kind, RecordKind::Choice("CHOICE_0_2".to_string()));
    }

    #[rstest]
    #[case::too_few("f1\t10\tTEXT\toriginal", RecordError::TooFewFields(4))]
    #[case::empty_translation("f1\t10\tTEXT\toriginal\t", RecordError::EmptyTranslation)]
    #[case::header("FILE\tINDEX\tTYPE\tORIGINAL\tTRANSLATION", RecordError::InvalidIndex("INDEX".to_string()))]
    #[case::unknown_kind("f1\t10\tJUMP\ta\tb", RecordError::UnknownKind("JUMP".to_string()))]
    fn test_parse_record_errors(#[case] line: &str, #[case] expected: RecordError) {
        assert_eq!(parse_record(line), Err(expected));
    }

    #[googletest::test]
    fn extra_columns_are_ignored() {
        let record = parse_record("f1\t1\tMSG\ta\tb\tnote").unwrap();

        let TableRecord::Text(text) = record else {
            panic!("expected a text record");
        };
        expect_that!(text.translated, eq("b"));
    }

    #[rstest]
    #[case::plain("太郎\tTaro", Some(("太郎", "Taro")))]
    #[case::usage_count("太郎\tTaro\t5", Some(("太郎", "Taro")))]
    #[case::trailing_spaces("太郎\tTaro  ", Some(("太郎", "Taro")))]
    #[case::escaped("a\\nb\tA\\tB", Some(("a\nb", "A\tB")))]
    #[case::header("ORIGINAL\tTRANSLATION", None)]
    #[case::untranslated("太郎\t", None)]
    #[case::untranslated_with_count("太郎\t\t5", None)]
    #[case::empty_original("\tTaro", None)]
    #[case::no_tab("太郎", None)]
    fn test_parse_global_name(#[case] line: &str, #[case] expected: Option<(&str, &str)>) {
        let expected = expected.map(|(original, translated)| GlobalNameEntry {
            original: original.to_string(),
            translated: translated.to_string(),
        });
        assert_eq!(parse_global_name(line), expected);
    }
}
