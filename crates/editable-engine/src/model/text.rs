//! UTF-16 offset helpers.
//!
//! Node values are Rust strings but every offset exchanged with the host is
//! measured in UTF-16 code units, matching what text-rendering surfaces report.

use std::sync::LazyLock;

use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is a valid regex"));

pub(crate) fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Byte index of a UTF-16 offset, clamped to the string and rounded down
/// when the offset falls inside a surrogate pair
pub(crate) fn byte_index(s: &str, ofs: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > ofs {
            return byte;
        }
        units = next;
    }
    s.len()
}

pub(crate) fn utf16_index(s: &str, byte: usize) -> usize {
    utf16_len(&s[..byte.min(s.len())])
}

/// Substring between two UTF-16 offsets
pub(crate) fn slice(s: &str, from: usize, to: usize) -> &str {
    let start = byte_index(s, from);
    let end = byte_index(s, to).max(start);
    &s[start..end]
}

/// Word boundaries around `ofs`: the span of the word touching the offset, or
/// an empty span at `ofs` when it sits between non-word characters
pub(crate) fn word_edges(s: &str, ofs: usize) -> (usize, usize) {
    let byte = byte_index(s, ofs);
    WORD.find_iter(s)
        .find(|m| m.start() <= byte && byte <= m.end())
        .map(|m| (utf16_index(s, m.start()), utf16_index(s, m.end())))
        .unwrap_or_else(|| {
            let at = ofs.min(utf16_len(s));
            (at, at)
        })
}
