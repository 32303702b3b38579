use crate::utf8::Decoded;

/// Apostrophe-like codepoints that continue a word
const AGGREGATION_MARKS: [char; 3] = ['\'', '\u{2018}', '\u{2019}'];

/// Folds applied after lowercasing, sorted by source codepoint
const LETTER_FOLDS: [(char, char); 23] = [
    ('à', 'a'),
    ('á', 'a'),
    ('â', 'a'),
    ('ã', 'a'),
    ('ä', 'a'),
    ('ç', 'c'),
    ('è', 'e'),
    ('é', 'e'),
    ('ê', 'e'),
    ('ë', 'e'),
    ('ì', 'i'),
    ('í', 'i'),
    ('î', 'i'),
    ('ï', 'i'),
    ('ò', 'o'),
    ('ó', 'o'),
    ('ô', 'o'),
    ('õ', 'o'),
    ('ö', 'o'),
    ('ù', 'u'),
    ('ú', 'u'),
    ('û', 'u'),
    ('ü', 'u'),
];

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Role of a codepoint in word segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Alphanumeric or underscore; belongs to a word
    WordConstituent,

    /// Continues the current word without closing it
    AggregationMark,

    /// Whitespace, punctuation, separators, invalid bytes; closes the current word
    Boundary,
}

/// Table-driven character classification shared by the chunk producer and the counter
#[derive(Debug, Clone, Copy, Default)]
pub struct WordClassifier;

impl WordClassifier {
    pub const fn new() -> Self {
        Self
    }

    pub fn classify(&self, ch: char) -> CharClass {
        if self.is_word_constituent(ch) {
            CharClass::WordConstituent
        } else if self.is_aggregation_mark(ch) {
            CharClass::AggregationMark
        } else {
            CharClass::Boundary
        }
    }

    pub fn classify_decoded(&self, value: Decoded) -> CharClass {
        match value {
            Decoded::Scalar(ch) => self.classify(ch),
            Decoded::Invalid(_) => CharClass::Boundary,
        }
    }

    pub fn is_word_constituent(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    pub fn is_aggregation_mark(&self, ch: char) -> bool {
        AGGREGATION_MARKS.contains(&ch)
    }

    /// Lowercase, then fold accented Latin letters onto their base letter
    pub fn normalize(&self, ch: char) -> char {
        let mut lower = ch.to_lowercase();
        let ch = match (lower.next(), lower.next()) {
            (Some(single), None) => single,
            _ => ch,
        };

        LETTER_FOLDS
            .binary_search_by_key(&ch, |&(from, _)| from)
            .map(|idx| LETTER_FOLDS[idx].1)
            .unwrap_or(ch)
    }

    /// Slot `0..26` of the normalized consonant, `None` for anything else
    pub fn consonant_slot(&self, ch: char) -> Option<u8> {
        let ch = self.normalize(ch);
        if !ch.is_ascii_lowercase() || VOWELS.contains(&ch) {
            return None;
        }
        Some(ch as u8 - b'a')
    }

    pub fn is_consonant(&self, ch: char) -> bool {
        self.consonant_slot(ch).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIFIER: WordClassifier = WordClassifier::new();

    #[test]
    fn fold_table_is_sorted() {
        assert!(LETTER_FOLDS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn word_constituents() {
        for ch in ['a', 'Z', '0', '9', '_', 'ç', 'Ã', 'ж', '日'] {
            assert_eq!(CLASSIFIER.classify(ch), CharClass::WordConstituent, "{ch:?}");
        }
    }

    #[test]
    fn aggregation_marks() {
        for ch in ['\'', '‘', '’'] {
            assert_eq!(CLASSIFIER.classify(ch), CharClass::AggregationMark, "{ch:?}");
        }
    }

    #[test]
    fn boundaries() {
        for ch in [' ', '\t', '\n', '\r', '.', ',', ':', ';', '?', '!', '-', '"', '(', ')', '[', ']', '–', '—', '…', '“', '”'] {
            assert_eq!(CLASSIFIER.classify(ch), CharClass::Boundary, "{ch:?}");
        }
        assert_eq!(
            CLASSIFIER.classify_decoded(Decoded::Invalid(0xFF)),
            CharClass::Boundary
        );
    }

    #[test]
    fn normalization_lowercases_and_folds() {
        let folded: String = "MAÇÃ".chars().map(|c| CLASSIFIER.normalize(c)).collect();
        assert_eq!(folded, "maca");
        assert_eq!(CLASSIFIER.normalize('É'), 'e');
        assert_eq!(CLASSIFIER.normalize('ж'), 'ж');
    }

    #[test]
    fn consonants() {
        assert!(CLASSIFIER.is_consonant('b'));
        assert!(CLASSIFIER.is_consonant('Z'));
        assert!(CLASSIFIER.is_consonant('ç'));
        assert_eq!(CLASSIFIER.consonant_slot('Ç'), Some(2));
        for ch in ['a', 'E', 'í', 'õ', 'ü', '7', '_', 'ж'] {
            assert!(!CLASSIFIER.is_consonant(ch), "{ch:?}");
        }
    }
}
