//! Sentence-level tokenization into aligned phoneme and grapheme streams.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::TokenizerConfig;
use crate::corpus::CorpusRecord;
use crate::error::Result;
use crate::rules::RuleTable;
use crate::transducer::{word_to_graphemes, word_to_phonemes};

/// Phoneme and grapheme streams produced for one sentence.
///
/// Both streams carry exactly `words - 1` separator tokens at the same word boundaries. Their
/// lengths can differ: phonemes are matched on the lowercased word, graphemes on the word as
/// written, so `Dh` is one phoneme but two graphemes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemizedSentence {
    /// Phoneme tokens with separators between words.
    pub phonemes: Vec<String>,
    /// Grapheme tokens with separators between words.
    pub graphemes: Vec<String>,
}

impl PhonemizedSentence {
    /// Joins both streams with single spaces into a corpus record.
    #[must_use]
    pub fn to_record(&self) -> CorpusRecord {
        CorpusRecord {
            phonemes: self.phonemes.join(" "),
            graphemes: self.graphemes.join(" "),
        }
    }

    /// Returns true when the sentence contained no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty() && self.graphemes.is_empty()
    }
}

/// Splits sentences into words and transduces each word against an owned [`RuleTable`].
#[derive(Debug, Clone, Default)]
pub struct SentenceTokenizer {
    rules: RuleTable,
    cfg: TokenizerConfig,
}

impl SentenceTokenizer {
    /// Creates a tokenizer after validating `cfg`.
    pub fn new(rules: RuleTable, cfg: TokenizerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { rules, cfg })
    }

    /// Returns the rule table used for transduction.
    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &TokenizerConfig {
        &self.cfg
    }

    /// Word separator token used between words.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.cfg.separator
    }

    /// Phonemizes one sentence.
    ///
    /// Words are split on Unicode whitespace. The separator is appended after every word and a
    /// single trailing separator is removed at the end, so neither stream starts or ends with
    /// one.
    #[must_use]
    pub fn phonemize_sentence(&self, sentence: &str) -> PhonemizedSentence {
        let separator = self.cfg.separator.as_str();
        let mut out = PhonemizedSentence::default();
        for word in sentence.split_whitespace() {
            out.phonemes.extend(word_to_phonemes(&self.rules, word));
            out.phonemes.push(separator.to_owned());

            let graphemes = if self.cfg.lowercase_graphemes {
                word_to_graphemes(&self.rules, &word.to_lowercase())
            } else {
                word_to_graphemes(&self.rules, word)
            };
            out.graphemes.extend(graphemes);
            out.graphemes.push(separator.to_owned());
        }
        if out.phonemes.last().map(String::as_str) == Some(separator) {
            out.phonemes.pop();
        }
        if out.graphemes.last().map(String::as_str) == Some(separator) {
            out.graphemes.pop();
        }
        out
    }

    /// Phonemizes many sentences in parallel, preserving input order.
    #[must_use]
    pub fn phonemize_batch<S>(&self, sentences: &[S]) -> Vec<PhonemizedSentence>
    where
        S: AsRef<str> + Sync,
    {
        sentences
            .par_iter()
            .map(|sentence| self.phonemize_sentence(sentence.as_ref()))
            .collect()
    }
}

/// Phonemizes a sentence with the default Somali rules and configuration.
///
/// Convenience wrapper; long-lived callers should keep a [`SentenceTokenizer`] instead of
/// rebuilding the rule table per call.
#[must_use]
pub fn phonemize_sentence(sentence: &str) -> PhonemizedSentence {
    SentenceTokenizer::default().phonemize_sentence(sentence)
}
