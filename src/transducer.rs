//! Word-level grapheme-to-phoneme transduction.
//!
//! A word is scanned left to right once. At every position the two-character window is
//! resolved by [`RuleTable::resolve_pair`]; each resulting [`Segment`] carries the phoneme its
//! rule produced, and is then rendered either as phonemes or as literal grapheme units. Both
//! functions are total: characters the table does not know pass through unchanged.

use crate::rules::{RuleKind, RuleTable};

/// A run of one or two characters consumed by a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Rule that consumed the characters.
    pub kind: RuleKind,
    /// Literal characters covered by the segment.
    pub text: String,
    /// Phoneme emitted for the segment; a geminate emits it twice.
    pub phone: String,
}

impl Segment {
    fn new(kind: RuleKind, chars: &[char], phone: String) -> Self {
        Self {
            kind,
            text: chars.iter().collect(),
            phone,
        }
    }

    /// Number of phoneme tokens this segment renders to.
    #[must_use]
    pub fn phone_count(&self) -> usize {
        match self.kind {
            RuleKind::Gemination => 2,
            _ => 1,
        }
    }
}

/// Segments a lowercased word for phoneme generation.
///
/// Long vowels and digraphs consume two characters, a doubled letter is reported as one
/// [`RuleKind::Gemination`] segment, anything else is a [`RuleKind::Single`].
#[must_use]
pub fn phoneme_segments(rules: &RuleTable, word: &str) -> Vec<Segment> {
    let chars: Vec<char> = word.to_lowercase().chars().collect();
    let mut segments = Vec::with_capacity(chars.len());
    let mut i = 0usize;
    while i < chars.len() {
        if i + 1 < chars.len() {
            if let Some((kind, phone)) = rules.resolve_pair(chars[i], chars[i + 1]) {
                segments.push(Segment::new(kind, &chars[i..i + 2], phone));
                i += 2;
                continue;
            }
        }
        let phone = rules.single_or_identity(chars[i]);
        segments.push(Segment::new(RuleKind::Single, &chars[i..=i], phone));
        i += 1;
    }
    segments
}

/// Segments a word into grapheme units.
///
/// Only long vowels and digraphs are grouped; doubled letters stay two separate units. The
/// word is matched as written (no case folding) so grapheme tokens keep the surface form.
#[must_use]
pub fn grapheme_segments(rules: &RuleTable, word: &str) -> Vec<Segment> {
    let chars: Vec<char> = word.chars().collect();
    let mut segments = Vec::with_capacity(chars.len());
    let mut i = 0usize;
    while i < chars.len() {
        if i + 1 < chars.len() {
            match rules.resolve_pair(chars[i], chars[i + 1]) {
                Some((RuleKind::Gemination, _)) | None => {}
                Some((kind, phone)) => {
                    segments.push(Segment::new(kind, &chars[i..i + 2], phone));
                    i += 2;
                    continue;
                }
            }
        }
        let phone = rules.single_or_identity(chars[i]);
        segments.push(Segment::new(RuleKind::Single, &chars[i..=i], phone));
        i += 1;
    }
    segments
}

/// Converts one word into its phoneme tokens.
///
/// Geminates are emitted as two identical phonemes rather than a length-marked one, e.g.
/// `maallin` yields `m aː l l i n`.
#[must_use]
pub fn word_to_phonemes(rules: &RuleTable, word: &str) -> Vec<String> {
    let mut phonemes = Vec::new();
    for segment in phoneme_segments(rules, word) {
        for _ in 1..segment.phone_count() {
            phonemes.push(segment.phone.clone());
        }
        phonemes.push(segment.phone);
    }
    phonemes
}

/// Converts one word into its grapheme tokens.
#[must_use]
pub fn word_to_graphemes(rules: &RuleTable, word: &str) -> Vec<String> {
    grapheme_segments(rules, word)
        .into_iter()
        .map(|segment| segment.text)
        .collect()
}
