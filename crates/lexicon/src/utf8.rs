//! UTF-8 scanning that never fails.
//!
//! Sequence length comes from the leading byte (`0xxxxxxx` → 1, `110xxxxx` → 2,
//! `1110xxxx` → 3, `11110xxx` → 4). A byte that does not start a well-formed
//! sequence decodes to [`Decoded::Invalid`] and scanning resumes at the next byte.

/// Longest UTF-8 sequence
pub const MAX_SEQUENCE_LEN: usize = 4;

/// Length of the sequence announced by `lead`, `None` for continuation and invalid bytes
pub const fn sequence_len(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xE0 == 0xC0 {
        Some(2)
    } else if lead & 0xF0 == 0xE0 {
        Some(3)
    } else if lead & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

pub const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Scalar(char),
    Invalid(u8),
}

/// One decoded codepoint (or invalid byte) and where it sits in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedUnit {
    pub offset: usize,
    pub len: usize,
    pub value: Decoded,
}

impl DecodedUnit {
    /// Offset just past this unit
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Iterator over the codepoints of a byte buffer
#[derive(Debug, Clone)]
pub struct Utf8Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Utf8Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl Iterator for Utf8Decoder<'_> {
    type Item = DecodedUnit;

    fn next(&mut self) -> Option<DecodedUnit> {
        let offset = self.pos;
        let lead = *self.bytes.get(offset)?;

        // from_utf8 also rejects overlong forms, surrogates and bad continuations.
        let unit = sequence_len(lead)
            .and_then(|len| self.bytes.get(offset..offset + len))
            .and_then(|seq| std::str::from_utf8(seq).ok())
            .and_then(|s| s.chars().next())
            .map(|ch| DecodedUnit {
                offset,
                len: ch.len_utf8(),
                value: Decoded::Scalar(ch),
            })
            .unwrap_or(DecodedUnit {
                offset,
                len: 1,
                value: Decoded::Invalid(lead),
            });

        self.pos += unit.len;
        Some(unit)
    }
}

/// Number of trailing bytes that form a truncated sequence.
///
/// Zero when the buffer ends on a complete codepoint, or when the trailing
/// bytes cannot belong to any sequence (they decode as invalid bytes anyway).
pub fn incomplete_tail_len(bytes: &[u8]) -> usize {
    let n = bytes.len();
    for back in 1..=n.min(MAX_SEQUENCE_LEN) {
        let byte = bytes[n - back];
        if is_continuation(byte) {
            continue;
        }
        return match sequence_len(byte) {
            Some(len) if len > back => back,
            _ => 0,
        };
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(bytes: &[u8]) -> Vec<Decoded> {
        Utf8Decoder::new(bytes).map(|unit| unit.value).collect()
    }

    #[test]
    fn sequence_len_follows_leading_bit_pattern() {
        assert_eq!(sequence_len(b'a'), Some(1));
        assert_eq!(sequence_len(0xC3), Some(2));
        assert_eq!(sequence_len(0xE2), Some(3));
        assert_eq!(sequence_len(0xF0), Some(4));
        assert_eq!(sequence_len(0x80), None);
        assert_eq!(sequence_len(0xF8), None);
        assert_eq!(sequence_len(0xFF), None);
    }

    #[test]
    fn decodes_mixed_width_text() {
        let units: Vec<_> = Utf8Decoder::new("aç€😀".as_bytes()).collect();
        let lens: Vec<_> = units.iter().map(|u| u.len).collect();
        let offsets: Vec<_> = units.iter().map(|u| u.offset).collect();

        assert_eq!(lens, vec![1, 2, 3, 4]);
        assert_eq!(offsets, vec![0, 1, 3, 6]);
        assert_eq!(units[3].end(), 10);
        assert_eq!(units[1].value, Decoded::Scalar('ç'));
    }

    #[test]
    fn invalid_bytes_are_reported_one_at_a_time() {
        // stray continuation, truncated 3-byte lead followed by ASCII, 0xFF
        let decoded = values(&[0x80, b'a', 0xE2, 0x82, b'b', 0xFF]);
        assert_eq!(
            decoded,
            vec![
                Decoded::Invalid(0x80),
                Decoded::Scalar('a'),
                Decoded::Invalid(0xE2),
                Decoded::Invalid(0x82),
                Decoded::Scalar('b'),
                Decoded::Invalid(0xFF),
            ]
        );
    }

    #[test]
    fn overlong_encoding_is_invalid() {
        assert_eq!(
            values(&[0xC0, 0xAF]),
            vec![Decoded::Invalid(0xC0), Decoded::Invalid(0xAF)]
        );
    }

    #[test]
    fn incomplete_tail_detection() {
        let euro = "€".as_bytes(); // E2 82 AC

        assert_eq!(incomplete_tail_len(b"abc"), 0);
        assert_eq!(incomplete_tail_len(euro), 0);
        assert_eq!(incomplete_tail_len(&euro[..2]), 2);
        assert_eq!(incomplete_tail_len(&euro[..1]), 1);
        assert_eq!(incomplete_tail_len(&[b'x', 0xF0, 0x9F, 0x98]), 3);
        assert_eq!(incomplete_tail_len("maçã".as_bytes()), 0);
        assert_eq!(incomplete_tail_len(&[0x80, 0x80, 0x80, 0x80]), 0);
        assert_eq!(incomplete_tail_len(&[]), 0);
    }
}
