//! Shift-JIS / UTF-8 の判定と変換
//!
//! ゲーム本体は Shift-JIS (CP932) のバイト列で文字列を渡してくるが、
//! 翻訳テーブルとインデックスは UTF-8 で保持する。

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{
    EncoderResult,
    SHIFT_JIS,
};

/// UTF-8 BOM
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// 判定に使う先頭バイト数
const DETECT_WINDOW: usize = 1000;

/// 変換できない文字の代替バイト（CP932 の既定文字と同じ）
const UNMAPPABLE_REPLACEMENT: u8 = b'?';

/// 判定されたテーブルのエンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEncoding {
    /// 入力が空
    Unknown,
    Utf8Bom,
    Utf8,
    ShiftJis,
}

impl fmt::Display for TableEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::Utf8Bom => "UTF-8 (BOM)",
            Self::Utf8 => "UTF-8",
            Self::ShiftJis => "Shift-JIS",
        };
        f.write_str(name)
    }
}

/// Shift-JIS の先行バイトか
#[must_use]
pub const fn is_lead_byte(byte: u8) -> bool {
    matches!(byte, 0x81..=0x9F | 0xE0..=0xFC)
}

/// Shift-JIS の後続バイトか
#[must_use]
pub const fn is_trail_byte(byte: u8) -> bool {
    matches!(byte, 0x40..=0x7E | 0x80..=0xFC)
}

const fn is_continuation(byte: u8) -> bool {
    matches!(byte, 0x80..=0xBF)
}

/// バイト列のエンコーディングを推定する
///
/// BOM を最優先で確認し、それ以外は先頭 1000 バイトをスコアリングする。
/// UTF-8 の 2/3 バイト列はバイト長を、Shift-JIS の 2 バイト文字は 2 を加算する。
/// Shift-JIS は `sjis > 0` かつ `utf8 <= 2 * sjis` のときだけ採用し、
/// ASCII のみの入力は UTF-8 とみなす。
#[must_use]
pub fn detect(bytes: &[u8]) -> TableEncoding {
    if bytes.is_empty() {
        return TableEncoding::Unknown;
    }
    if bytes.starts_with(&UTF8_BOM) {
        return TableEncoding::Utf8Bom;
    }

    let window = bytes.get(..DETECT_WINDOW).unwrap_or(bytes);
    let mut utf8_score = 0usize;
    let mut sjis_score = 0usize;

    // 後続バイトは判定窓を越えて読んでもよい（元のバッファ長で判定する）
    let at = |i: usize| bytes.get(i).copied();
    let mut i = 0;
    while let Some(&c) = window.get(i) {
        if (0xC0..=0xDF).contains(&c) && at(i + 1).is_some_and(is_continuation) {
            utf8_score += 2;
            i += 2;
            continue;
        }
        if (0xE0..=0xEF).contains(&c)
            && at(i + 1).is_some_and(is_continuation)
            && at(i + 2).is_some_and(is_continuation)
        {
            utf8_score += 3;
            i += 3;
            continue;
        }
        if is_lead_byte(c) && at(i + 1).is_some_and(is_trail_byte) {
            sjis_score += 2;
            i += 2;
            continue;
        }
        i += 1;
    }

    tracing::trace!(utf8_score, sjis_score, "Encoding scores");

    if sjis_score > 0 && utf8_score <= sjis_score * 2 {
        TableEncoding::ShiftJis
    } else {
        TableEncoding::Utf8
    }
}

/// Shift-JIS のバイト列を UTF-8 に変換する
///
/// 空入力、または不正なバイト列の場合は空文字列を返す（失敗は「翻訳なし」扱い）。
#[must_use]
pub fn to_universal(legacy: &[u8]) -> String {
    if legacy.is_empty() {
        return String::new();
    }
    SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(legacy)
        .map_or_else(
            || {
                tracing::debug!(len = legacy.len(), "Failed to decode Shift-JIS input");
                String::new()
            },
            Cow::into_owned,
        )
}

/// UTF-8 文字列を Shift-JIS のバイト列に変換する
///
/// CP932 に存在しない文字は `?` に置き換える。空入力は空を返す。
#[must_use]
pub fn to_legacy(text: &str) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut encoder = SHIFT_JIS.new_encoder();
    let mut out = Vec::with_capacity(text.len() + 8);
    let mut rest = text;
    loop {
        if out.capacity() - out.len() < 8 {
            out.reserve(rest.len().max(8));
        }
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        rest = rest.get(read..).unwrap_or_default();
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => out.reserve(rest.len().max(8)),
            EncoderResult::Unmappable(ch) => {
                tracing::debug!(?ch, "Character not representable in Shift-JIS");
                out.push(UNMAPPABLE_REPLACEMENT);
            }
        }
    }
    out
}

/// テーブルファイル全体を UTF-8 文字列に正規化する
///
/// ルックアップ用の [`to_universal`] と違い、テーブルは 1 バイトの破損で
/// 全体を捨てないよう置換文字で復号する。
#[must_use]
pub fn decode_table(bytes: &[u8], encoding: TableEncoding) -> String {
    match encoding {
        TableEncoding::Unknown => String::new(),
        TableEncoding::Utf8Bom => {
            String::from_utf8_lossy(bytes.get(UTF8_BOM.len()..).unwrap_or_default()).into_owned()
        }
        TableEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        TableEncoding::ShiftJis => {
            let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
            if had_errors {
                tracing::warn!("Table contains bytes that are not valid Shift-JIS");
            }
            text.into_owned()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn sjis(text: &str) -> Vec<u8> {
        SHIFT_JIS.encode(text).0.into_owned()
    }

    #[rstest]
    fn test_detect_empty_is_unknown() {
        assert_eq!(detect(b""), TableEncoding::Unknown);
    }

    #[rstest]
    fn test_detect_bom_wins() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(&sjis("太郎\tTaro"));
        assert_eq!(detect(&bytes), TableEncoding::Utf8Bom);
    }

    #[rstest]
    #[case::ascii("f1\t10\tTEXT\thello\tworld")]
    #[case::japanese("f1\t10\tTEXT\tこんにちは\tHello")]
    fn test_detect_utf8(#[case] text: &str) {
        assert_eq!(detect(text.as_bytes()), TableEncoding::Utf8);
    }

    #[rstest]
    fn test_detect_shift_jis() {
        let bytes = sjis("f1\t10\tTEXT\tこんにちは、世界\tHello, world");
        assert_eq!(detect(&bytes), TableEncoding::ShiftJis);
    }

    #[rstest]
    fn test_detect_utf8_must_dominate_by_more_than_double() {
        // "é" = C3 A9 は UTF-8 として 2 点、"\x81\x40" は Shift-JIS として 2 点
        // utf8 (2) <= 2 * sjis (2) なので Shift-JIS
        let bytes = [0xC3, 0xA9, b' ', 0x81, 0x40];
        assert_eq!(detect(&bytes), TableEncoding::ShiftJis);
    }

    #[googletest::test]
    fn round_trip_preserves_representable_text() {
        let original = sjis("太郎「こんにちは」");

        let utf8 = to_universal(&original);
        expect_that!(utf8, eq("太郎「こんにちは」"));
        expect_that!(to_legacy(&utf8) == original, eq(true));
    }

    #[googletest::test]
    fn empty_input_yields_empty_output() {
        expect_that!(to_universal(b""), eq(""));
        expect_that!(to_legacy("").is_empty(), eq(true));
    }

    #[googletest::test]
    fn invalid_legacy_input_yields_empty() {
        // 先行バイトで終わる不完全な列
        expect_that!(to_universal(&[b'a', 0x82]), eq(""));
    }

    #[googletest::test]
    fn unmappable_characters_become_question_marks() {
        let encoded = to_legacy("a😀b");
        expect_that!(encoded == b"a?b".to_vec(), eq(true));
    }

    #[googletest::test]
    fn decode_table_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("# comment".as_bytes());
        expect_that!(decode_table(&bytes, TableEncoding::Utf8Bom), eq("# comment"));
    }

    #[googletest::test]
    fn decode_table_shift_jis() {
        let bytes = sjis("太郎\tTaro");
        expect_that!(decode_table(&bytes, TableEncoding::ShiftJis), eq("太郎\tTaro"));
    }
}
