//! Where a chunk may end.
//!
//! A cut is safe when it falls right after a boundary unit (whitespace,
//! punctuation, separator or an undecodable byte): the counter is idle there,
//! so counting both sides separately gives the same totals as one pass.

use wordfreq_lexicon::utf8::{incomplete_tail_len, Utf8Decoder};
use wordfreq_lexicon::{CharClass, WordClassifier};

/// Length of the prefix that does not end inside a multi-byte codepoint
pub fn codepoint_safe_len(buf: &[u8]) -> usize {
    buf.len() - incomplete_tail_len(buf)
}

/// Length of the prefix ending right after its last boundary unit
pub fn word_safe_len(buf: &[u8], classifier: &WordClassifier) -> Option<usize> {
    Utf8Decoder::new(buf)
        .filter(|unit| classifier.classify_decoded(unit.value) == CharClass::Boundary)
        .last()
        .map(|unit| unit.end())
}

/// Both alignment passes. `None` when no safe cut exists inside `buf`.
pub fn align(buf: &[u8], classifier: &WordClassifier) -> Option<usize> {
    let safe = codepoint_safe_len(buf);
    word_safe_len(&buf[..safe], classifier).filter(|&len| len > 0)
}
