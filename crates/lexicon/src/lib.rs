//! # Wordfreq Lexicon
//!
//! Worker-side lexical analysis: UTF-8 decoding, character classification and
//! word counting.
//!
//! ## Words
//!
//! A word is a maximal run of word-constituent codepoints (Unicode alphanumeric
//! or `_`), optionally glued together by aggregation marks (`'`, `‘`, `’`).
//! Anything else, including bytes that do not decode, closes the current word.
//!
//! A word is a *consonant-repeat word* when, after normalization (lowercase,
//! accent folding), the same consonant letter appears twice in it.
//!
//! ## Example
//!
//! ```rust
//! use wordfreq_lexicon::LexicalCounter;
//!
//! let tally = LexicalCounter::new().count("A llama, a gato and a maçã.".as_bytes());
//! assert_eq!(tally.words, 7);
//! assert_eq!(tally.consonant_words, 1);
//! ```

mod classify;
mod counter;
mod error;
pub mod utf8;

pub use classify::{CharClass, WordClassifier};
pub use counter::{LexicalCounter, WordTally};
pub use error::{LexiconError, Result};
