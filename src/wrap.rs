//! Shift-JIS テキストの折り返し
//!
//! 2 バイト文字を分割しない貪欲な単一パス。改行は空白の置き換えでのみ挿入し、
//! バイトを削除することはない。

use crate::encoding::is_lead_byte;

/// `max_width` 桁で折り返す
///
/// 全角文字（先行バイト + 後続バイト）は幅 2 の単位としてまとめて扱い、
/// 区切り位置にはしない。行の長さが `max_width` に達した時点で、その行内の
/// 直近の空白を改行に置き換える。空白がなければそのままはみ出させる。
/// `max_width == 0` または空入力は入力をそのまま返す。
#[must_use]
pub fn wrap(text: &[u8], max_width: usize) -> Vec<u8> {
    if max_width == 0 || text.is_empty() {
        return text.to_vec();
    }

    let mut out = Vec::with_capacity(text.len());
    let mut line_start = 0usize;
    let mut line_len = 0usize;
    let mut last_space: Option<usize> = None;

    let mut bytes = text.iter().copied();
    while let Some(byte) = bytes.next() {
        if byte == b'\n' {
            out.push(byte);
            line_start = out.len();
            line_len = 0;
            last_space = None;
            continue;
        }

        if is_lead_byte(byte) {
            out.push(byte);
            line_len += 1;
            if let Some(trail) = bytes.next() {
                out.push(trail);
                line_len += 1;
            }
        } else {
            if byte == b' ' {
                last_space = Some(out.len());
            }
            out.push(byte);
            line_len += 1;
        }

        if line_len >= max_width
            && let Some(space) = last_space.filter(|&pos| pos >= line_start)
            && let Some(slot) = out.get_mut(space)
        {
            *slot = b'\n';
            line_start = space + 1;
            line_len = out.len() - line_start;
            last_space = None;
        }
    }

    out
}
