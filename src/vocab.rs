//! Deterministic vocabulary construction over phoneme/grapheme corpora.
//!
//! A vocabulary is a pure function of the *set* of tokens observed: the three reserved tokens
//! take ids 0, 1 and 2, every other token follows in lexicographic order. Partial
//! [`TokenSet`]s can therefore be gathered by any number of workers in any order and merged by
//! union before the single sort-and-assign step in [`Vocabulary::from_token_set`].

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::IngestConfig;
use crate::corpus::{collect_paths, visit_records, CorpusRecord};
use crate::error::{G2pError, Result};
use crate::metrics::BuildMetrics;
use crate::special_tokens::{self, ReservedToken, RESERVED};

/// Token identifier used throughout the crate.
pub type TokenId = u32;

/// Unordered set of distinct non-empty tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: FxHashSet<String>,
}

impl TokenSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a token; the empty string is ignored.
    pub fn insert(&mut self, token: &str) {
        if !token.is_empty() && !self.tokens.contains(token) {
            self.tokens.insert(token.to_owned());
        }
    }

    /// Inserts every token of a whitespace-delimited stream, returning how many were seen.
    pub fn extend_stream(&mut self, stream: &str) -> usize {
        let mut seen = 0usize;
        for token in stream.split_whitespace() {
            self.insert(token);
            seen += 1;
        }
        seen
    }

    /// Inserts the tokens of both streams of a record, returning how many were seen.
    pub fn add_record(&mut self, record: &CorpusRecord) -> usize {
        self.extend_stream(&record.phonemes) + self.extend_stream(&record.graphemes)
    }

    /// Set union; the result does not depend on which side is larger or merged first.
    #[must_use]
    pub fn merge(mut self, mut other: Self) -> Self {
        if self.tokens.len() < other.tokens.len() {
            std::mem::swap(&mut self, &mut other);
        }
        self.tokens.extend(other.tokens);
        self
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true when no token has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns true when `token` is in the set.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// Consumes the set, returning the non-reserved tokens in lexicographic order.
    #[must_use]
    pub fn into_sorted(self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .tokens
            .into_iter()
            .filter(|token| !special_tokens::is_reserved(token))
            .collect();
        tokens.sort_unstable();
        tokens
    }
}

impl<'a> Extend<&'a str> for TokenSet {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for token in iter {
            self.insert(token);
        }
    }
}

/// Bijective mapping between tokens and dense ids in `[0, len)`.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    ids: FxHashMap<String, TokenId>,
}

impl Vocabulary {
    /// Sorts the observed tokens and assigns ids after the reserved prefix.
    pub fn from_token_set(set: TokenSet) -> Self {
        let mut tokens: Vec<String> = RESERVED.iter().map(|&token| token.to_owned()).collect();
        tokens.extend(set.into_sorted());
        Self::index(tokens)
    }

    /// Rebuilds a vocabulary from tokens listed in id order, validating the reserved prefix,
    /// uniqueness and non-emptiness.
    pub fn from_ordered_tokens(tokens: Vec<String>) -> Result<Self> {
        for reserved in ReservedToken::ALL {
            let idx = reserved.id() as usize;
            match tokens.get(idx) {
                Some(token) if token == reserved.as_str() => {}
                found => {
                    return Err(G2pError::InvalidConfig(format!(
                        "id {idx} must be {:?}, found {found:?}",
                        reserved.as_str()
                    )))
                }
            }
        }
        if TokenId::try_from(tokens.len()).is_err() {
            return Err(G2pError::InvalidConfig(format!(
                "vocabulary of {} tokens exceeds the TokenId range",
                tokens.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for token in &tokens {
            if token.is_empty() {
                return Err(G2pError::InvalidConfig(
                    "vocabulary contains an empty token".into(),
                ));
            }
            if !seen.insert(token.as_str()) {
                return Err(G2pError::InvalidConfig(format!(
                    "vocabulary contains duplicate token {token:?}"
                )));
            }
        }
        Ok(Self::index(tokens))
    }

    fn index(tokens: Vec<String>) -> Self {
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (token.clone(), idx as TokenId))
            .collect();
        Self { tokens, ids }
    }

    /// Number of tokens including the reserved ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for vocabularies built by this crate; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Id of `token`, if present.
    #[must_use]
    pub fn id(&self, token: &str) -> Option<TokenId> {
        self.ids.get(token).copied()
    }

    /// Token for `id`, if in range.
    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Returns true when `token` is part of the vocabulary.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.ids.contains_key(token)
    }

    /// Tokens in id order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Id of `<pad>`.
    #[must_use]
    pub fn pad_id(&self) -> TokenId {
        ReservedToken::Pad.id()
    }

    /// Id of `<mask>`.
    #[must_use]
    pub fn mask_id(&self) -> TokenId {
        ReservedToken::Mask.id()
    }

    /// Id of `<unk>`.
    #[must_use]
    pub fn unk_id(&self) -> TokenId {
        ReservedToken::Unknown.id()
    }

    /// Token to id map with keys in sorted order.
    #[must_use]
    pub fn to_token_map(&self) -> BTreeMap<String, TokenId> {
        self.ids
            .iter()
            .map(|(token, &id)| (token.clone(), id))
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_token_set(TokenSet::new())
    }
}

/// Builds a vocabulary from an iterator of corpus records in a single pass.
pub fn build_vocabulary<'a, I>(records: I) -> Vocabulary
where
    I: IntoIterator<Item = &'a CorpusRecord>,
{
    let mut set = TokenSet::new();
    for record in records {
        set.add_record(record);
    }
    Vocabulary::from_token_set(set)
}

/// Builds a vocabulary from in-memory records, accumulating per-worker sets in parallel.
pub fn build_vocabulary_par(records: &[CorpusRecord]) -> Vocabulary {
    Vocabulary::from_token_set(parallel_token_set(records).set)
}

#[derive(Debug, Default)]
struct Tally {
    set: TokenSet,
    records: usize,
    occurrences: usize,
}

impl Tally {
    fn merge(self, other: Self) -> Self {
        Self {
            set: self.set.merge(other.set),
            records: self.records + other.records,
            occurrences: self.occurrences + other.occurrences,
        }
    }
}

fn parallel_token_set(records: &[CorpusRecord]) -> Tally {
    records
        .par_iter()
        .fold(Tally::default, |mut tally, record| {
            tally.occurrences += tally.set.add_record(record);
            tally.records += 1;
            tally
        })
        .reduce(Tally::default, Tally::merge)
}

/// Façade building vocabularies from record files or in-memory corpora.
#[derive(Debug, Clone, Default)]
pub struct VocabularyBuilder {
    ingest: IngestConfig,
}

/// Artifacts returned after a vocabulary build completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    /// Built vocabulary.
    pub vocab: Vocabulary,
    /// Counters captured during the build.
    pub metrics: BuildMetrics,
}

impl VocabularyBuilder {
    /// Creates a builder that discovers record files according to `ingest`.
    #[must_use]
    pub fn new(ingest: IngestConfig) -> Self {
        Self { ingest }
    }

    /// Returns the ingest configuration used for path discovery.
    #[must_use]
    pub fn ingest_config(&self) -> &IngestConfig {
        &self.ingest
    }

    /// Builds from in-memory records.
    pub fn build_from_records(&self, records: &[CorpusRecord]) -> BuildArtifacts {
        let start = Instant::now();
        let tally = parallel_token_set(records);
        finish(tally, 0, start)
    }

    /// Builds from JSONL record files; each file is scanned by its own worker.
    ///
    /// The first malformed record aborts the build with [`G2pError::InvalidRecord`].
    pub fn build_from_paths<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<BuildArtifacts> {
        let start = Instant::now();
        let files = collect_paths(inputs, &self.ingest)?;
        info!("scanning {} record files", files.len());
        let partials = files
            .par_iter()
            .map(|path| -> Result<Tally> {
                let mut tally = Tally::default();
                let records = visit_records(path, |record| {
                    tally.occurrences += tally.set.add_record(&record);
                })?;
                tally.records = records;
                debug!(
                    "{}: {} records, {} distinct tokens",
                    path.display(),
                    records,
                    tally.set.len()
                );
                Ok(tally)
            })
            .collect::<Result<Vec<_>>>()?;
        let tally = partials.into_iter().fold(Tally::default(), Tally::merge);
        Ok(finish(tally, files.len(), start))
    }
}

fn finish(tally: Tally, files: usize, start: Instant) -> BuildArtifacts {
    let vocab = Vocabulary::from_token_set(tally.set);
    let metrics = BuildMetrics {
        files,
        records: tally.records,
        token_occurrences: tally.occurrences,
        vocab_size: vocab.len(),
        duration: start.elapsed(),
    };
    info!(
        "built vocabulary: size={} records={} occurrences={} duration={:.2?}",
        metrics.vocab_size, metrics.records, metrics.token_occurrences, metrics.duration
    );
    BuildArtifacts { vocab, metrics }
}

impl fmt::Display for BuildArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vocabulary with {} tokens", self.vocab.len())?;
        writeln!(f, "Records scanned: {}", self.metrics.records)?;
        writeln!(f, "Total duration: {:?}", self.metrics.duration)?;
        Ok(())
    }
}
