//! Declarative rule tables driving the grapheme-to-phoneme transducer.
//!
//! The Somali table approximates the orthography described in standard references: long
//! vowels are written doubled, `dh`/`kh`/`sh` are consonant digraphs, and `c`/`x` stand for
//! the pharyngeals. Tables are plain data; a [`RuleTable`] is built once and passed by
//! reference to every consumer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{G2pError, Result};
use crate::special_tokens::is_reserved;

/// Which rule produced a segment of a word.
///
/// Variants are listed in lookahead priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Two identical vowels written for one lengthened vowel (`aa` -> `aː`).
    LongVowel,
    /// Consonant digraph mapped to a single phoneme (`sh` -> `ʃ`).
    Digraph,
    /// Doubled letter rendered as two identical phonemes.
    Gemination,
    /// Single character, mapped or passed through unchanged.
    Single,
}

const SOMALI_SINGLES: &[(char, &str)] = &[
    ('a', "a"),
    ('e', "e"),
    ('i', "i"),
    ('o', "o"),
    ('u', "u"),
    ('b', "b"),
    ('t', "t"),
    ('j', "dʒ"),
    ('x', "ħ"),
    ('d', "d"),
    ('r', "r"),
    ('s', "s"),
    ('c', "ʕ"),
    ('g', "ɡ"),
    ('f', "f"),
    ('q', "q"),
    ('k', "k"),
    ('l', "l"),
    ('m', "m"),
    ('n', "n"),
    ('p', "p"),
    ('w', "w"),
    ('y', "j"),
];

const SOMALI_DIGRAPHS: &[(&str, &str)] = &[("dh", "ð"), ("kh", "x"), ("sh", "ʃ")];

const SOMALI_LONG_VOWELS: &[(&str, &str)] = &[
    ("aa", "aː"),
    ("ee", "eː"),
    ("ii", "iː"),
    ("oo", "oː"),
    ("uu", "uː"),
];

type PairKey = [char; 2];

/// Immutable character, digraph and long-vowel mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    singles: FxHashMap<char, String>,
    digraphs: FxHashMap<PairKey, String>,
    long_vowels: FxHashMap<PairKey, String>,
}

/// Serialisable form of a [`RuleTable`] keyed by plain strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleTableSpec {
    /// Single character to phoneme.
    pub singles: BTreeMap<String, String>,
    /// Two-character consonant digraph to phoneme.
    pub digraphs: BTreeMap<String, String>,
    /// Two-character long vowel to lengthened phoneme.
    pub long_vowels: BTreeMap<String, String>,
}

impl RuleTable {
    /// Builds the built-in Somali rule table.
    #[must_use]
    pub fn somali() -> Self {
        let singles = SOMALI_SINGLES
            .iter()
            .map(|&(ch, phone)| (ch, phone.to_owned()))
            .collect();
        Self {
            singles,
            digraphs: static_pairs(SOMALI_DIGRAPHS),
            long_vowels: static_pairs(SOMALI_LONG_VOWELS),
        }
    }

    /// Builds and validates a table from its serialisable form.
    pub fn from_spec(spec: &RuleTableSpec) -> Result<Self> {
        let mut singles = FxHashMap::default();
        for (key, phone) in &spec.singles {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(G2pError::InvalidConfig(format!(
                    "single rule key {key:?} must be exactly one character"
                )));
            };
            ensure_phone(key, phone)?;
            singles.insert(ch, phone.clone());
        }
        let digraphs = pair_table("digraph", &spec.digraphs)?;
        let long_vowels = pair_table("long vowel", &spec.long_vowels)?;
        if let Some(shared) = digraphs.keys().find(|key| long_vowels.contains_key(*key)) {
            let key: String = shared.iter().collect();
            return Err(G2pError::InvalidConfig(format!(
                "{key:?} is both a digraph and a long vowel"
            )));
        }
        Ok(Self {
            singles,
            digraphs,
            long_vowels,
        })
    }

    /// Reads a JSON [`RuleTableSpec`] from disk and validates it.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| G2pError::io(err, Some(path.to_path_buf())))?;
        let spec: RuleTableSpec = serde_json::from_str(&raw)?;
        Self::from_spec(&spec)
    }

    /// Returns the serialisable form of this table with keys in sorted order.
    #[must_use]
    pub fn to_spec(&self) -> RuleTableSpec {
        let pairs = |table: &FxHashMap<PairKey, String>| {
            table
                .iter()
                .map(|(key, phone)| (key.iter().collect::<String>(), phone.clone()))
                .collect()
        };
        RuleTableSpec {
            singles: self
                .singles
                .iter()
                .map(|(ch, phone)| (ch.to_string(), phone.clone()))
                .collect(),
            digraphs: pairs(&self.digraphs),
            long_vowels: pairs(&self.long_vowels),
        }
    }

    /// Lengthened phoneme for the long vowel `first second`, if any.
    #[must_use]
    pub fn long_vowel(&self, first: char, second: char) -> Option<&str> {
        self.long_vowels.get(&[first, second]).map(String::as_str)
    }

    /// Phoneme for the consonant digraph `first second`, if any.
    #[must_use]
    pub fn digraph(&self, first: char, second: char) -> Option<&str> {
        self.digraphs.get(&[first, second]).map(String::as_str)
    }

    /// Mapped phoneme for a single character, if the table knows it.
    #[must_use]
    pub fn single(&self, ch: char) -> Option<&str> {
        self.singles.get(&ch).map(String::as_str)
    }

    /// Phoneme for a single character with identity fallback.
    #[must_use]
    pub fn single_or_identity(&self, ch: char) -> String {
        match self.single(ch) {
            Some(phone) => phone.to_owned(),
            None => ch.to_string(),
        }
    }

    /// Classifies the two-character window starting at `first`.
    ///
    /// Returns the rule that consumes both characters, or `None` when only `first` is consumed.
    /// Long vowels win over digraphs, which win over gemination.
    #[must_use]
    pub fn classify_pair(&self, first: char, second: char) -> Option<RuleKind> {
        self.resolve_pair(first, second).map(|(kind, _)| kind)
    }

    /// Like [`RuleTable::classify_pair`], also returning the phoneme the rule emits.
    ///
    /// For [`RuleKind::Gemination`] the phoneme is that of one letter; callers emit it twice.
    #[must_use]
    pub fn resolve_pair(&self, first: char, second: char) -> Option<(RuleKind, String)> {
        if let Some(phone) = self.long_vowel(first, second) {
            Some((RuleKind::LongVowel, phone.to_owned()))
        } else if let Some(phone) = self.digraph(first, second) {
            Some((RuleKind::Digraph, phone.to_owned()))
        } else if first == second {
            Some((RuleKind::Gemination, self.single_or_identity(first)))
        } else {
            None
        }
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::somali()
    }
}

fn static_pairs(entries: &[(&str, &str)]) -> FxHashMap<PairKey, String> {
    entries
        .iter()
        .filter_map(|&(key, phone)| {
            let mut chars = key.chars();
            Some(([chars.next()?, chars.next()?], phone.to_owned()))
        })
        .collect()
}

fn pair_table(
    label: &str,
    entries: &BTreeMap<String, String>,
) -> Result<FxHashMap<PairKey, String>> {
    let mut table = FxHashMap::default();
    for (key, phone) in entries {
        let mut chars = key.chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(G2pError::InvalidConfig(format!(
                "{label} rule key {key:?} must be exactly two characters"
            )));
        };
        ensure_phone(key, phone)?;
        table.insert([first, second], phone.clone());
    }
    Ok(table)
}

fn ensure_phone(key: &str, phone: &str) -> Result<()> {
    if phone.is_empty() || phone.chars().any(char::is_whitespace) {
        return Err(G2pError::InvalidConfig(format!(
            "rule {key:?} maps to {phone:?}; phonemes must be non-empty and contain no whitespace"
        )));
    }
    if is_reserved(phone) {
        return Err(G2pError::InvalidConfig(format!(
            "rule {key:?} maps to reserved token {phone:?}"
        )));
    }
    Ok(())
}
