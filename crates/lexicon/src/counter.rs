use crate::classify::{CharClass, WordClassifier};
use crate::error::{LexiconError, Result};
use crate::utf8::{Decoded, Utf8Decoder};
use wordfreq_protocol::{ChunkData, ChunkResult};

/// Counts for one buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordTally {
    pub words: u64,

    /// Words in which some normalized consonant occurs at least twice
    pub consonant_words: u64,

    /// Bytes that did not decode; each one closed the current word
    pub invalid_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordState {
    Idle,
    InWord,
    /// Current word already counted as a consonant-repeat word
    Saturated,
}

/// Consonants seen in the current word, one bit per letter `a..=z`
#[derive(Debug, Clone, Copy, Default)]
struct ConsonantSet(u32);

impl ConsonantSet {
    /// Insert, returning `true` when the consonant was already present
    fn insert(&mut self, slot: u8) -> bool {
        let bit = 1u32 << slot;
        let seen = self.0 & bit != 0;
        self.0 |= bit;
        seen
    }

    fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Word-segmenting state machine.
///
/// Stateless across calls: every buffer is counted from `Idle`, so chunks can
/// be processed in any order and on any worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalCounter {
    classifier: WordClassifier,
}

impl LexicalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(&self) -> &WordClassifier {
        &self.classifier
    }

    pub fn count(&self, bytes: &[u8]) -> WordTally {
        let mut tally = WordTally::default();
        let mut state = WordState::Idle;
        let mut consonants = ConsonantSet::default();

        for unit in Utf8Decoder::new(bytes) {
            let ch = match unit.value {
                Decoded::Scalar(ch) => ch,
                Decoded::Invalid(_) => {
                    tally.invalid_bytes += 1;
                    state = WordState::Idle;
                    continue;
                }
            };

            match self.classifier.classify(ch) {
                CharClass::Boundary => state = WordState::Idle,
                CharClass::AggregationMark => {}
                CharClass::WordConstituent => {
                    if state == WordState::Idle {
                        tally.words += 1;
                        consonants.clear();
                        state = WordState::InWord;
                    }
                    if state == WordState::Saturated {
                        continue;
                    }
                    if let Some(slot) = self.classifier.consonant_slot(ch) {
                        if consonants.insert(slot) {
                            tally.consonant_words += 1;
                            state = WordState::Saturated;
                        }
                    }
                }
            }
        }

        tally
    }

    /// Count one chunk and label the result with its file index
    pub fn process(&self, chunk: &ChunkData) -> Result<ChunkResult> {
        let span = chunk.end_offset.checked_sub(chunk.start_offset);
        if span != Some(chunk.len() as u64) {
            return Err(LexiconError::corrupt_chunk(
                chunk.file_index,
                format!(
                    "span {}..{} does not match {} data bytes",
                    chunk.start_offset,
                    chunk.end_offset,
                    chunk.len()
                ),
            ));
        }

        let tally = self.count(&chunk.bytes);
        if tally.invalid_bytes > 0 {
            log::debug!(
                "file {} @ {}: {} invalid UTF-8 bytes treated as word boundaries",
                chunk.file_index,
                chunk.start_offset,
                tally.invalid_bytes
            );
        }

        Ok(ChunkResult::new(
            chunk.file_index,
            tally.words,
            tally.consonant_words,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tally(text: &str) -> (u64, u64) {
        let t = LexicalCounter::new().count(text.as_bytes());
        (t.words, t.consonant_words)
    }

    #[test]
    fn single_words() {
        assert_eq!(tally("llama"), (1, 1));
        assert_eq!(tally("gato"), (1, 0));
        assert_eq!(tally("maçã"), (1, 0));
        assert_eq!(tally("MAÇÃ"), (1, 0));
        assert_eq!(tally("caça"), (1, 1));
    }

    #[test]
    fn empty_and_separator_only_buffers() {
        assert_eq!(tally(""), (0, 0));
        assert_eq!(tally(" \n\t.,;:!?-"), (0, 0));
        assert_eq!(tally("'’"), (0, 0));
    }

    #[test]
    fn aggregation_marks_glue_words() {
        assert_eq!(tally("don't"), (1, 0));
        assert_eq!(tally("d’água"), (1, 0));
        // t, t across the apostrophe
        assert_eq!(tally("it'tis"), (1, 1));
        assert_eq!(tally("'tis"), (1, 0));
    }

    #[test]
    fn repeat_counted_once_per_word() {
        assert_eq!(tally("mississippi"), (1, 1));
        assert_eq!(tally("bbb ccc ddd"), (3, 3));
    }

    #[test]
    fn consonant_set_resets_between_words() {
        assert_eq!(tally("cat cow"), (2, 0));
        assert_eq!(tally("ab-ba"), (2, 0));
    }

    #[test]
    fn digits_and_underscore_are_word_constituents() {
        assert_eq!(tally("abc_123 x2"), (2, 0));
        assert_eq!(tally("snake_case_name"), (1, 1));
    }

    #[test]
    fn invalid_bytes_close_words() {
        let counter = LexicalCounter::new();
        let t = counter.count(b"ll\xFFll");
        assert_eq!(
            t,
            WordTally {
                words: 2,
                consonant_words: 2,
                invalid_bytes: 1
            }
        );

        let t = counter.count(b"ab\xE2\x82cd");
        assert_eq!(t.words, 2);
        assert_eq!(t.invalid_bytes, 2);
    }

    #[test]
    fn sentence() {
        assert_eq!(
            tally("O rato roeu a roupa do rei de Roma; a rainha, com raiva, rasgou o resto."),
            (16, 0)
        );
        assert_eq!(tally("Little kittens shall sell seashells."), (5, 5));
    }

    #[test]
    fn process_labels_result_with_file_index() {
        let chunk = ChunkData::new(4, 100, &b"llama gato "[..]);
        let result = LexicalCounter::new().process(&chunk).unwrap();
        assert_eq!(result, ChunkResult::new(4, 2, 1));
    }

    #[test]
    fn process_rejects_inconsistent_span() {
        let mut chunk = ChunkData::new(1, 10, &b"word "[..]);
        chunk.end_offset = 12;

        let err = LexicalCounter::new().process(&chunk).unwrap_err();
        assert!(matches!(err, LexiconError::CorruptChunk { file_index: 1, .. }));

        chunk.end_offset = 5;
        assert!(LexicalCounter::new().process(&chunk).is_err());
    }
}
