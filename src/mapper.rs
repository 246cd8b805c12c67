//! Mapping between token streams and integer id sequences.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corpus::CorpusRecord;
use crate::error::{G2pError, Result};
use crate::vocab::{TokenId, Vocabulary};

/// Which stream of a [`CorpusRecord`] to encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamField {
    /// The phoneme stream (what the masked-language-model trainer consumes).
    #[default]
    Phonemes,
    /// The grapheme stream.
    Graphemes,
}

impl StreamField {
    fn select(self, record: &CorpusRecord) -> &str {
        match self {
            Self::Phonemes => &record.phonemes,
            Self::Graphemes => &record.graphemes,
        }
    }
}

/// Maps every token to its id, substituting the `<unk>` id for tokens not in `vocab`.
///
/// The output always has the same length as the input.
#[must_use]
pub fn map_to_ids<S: AsRef<str>>(stream: &[S], vocab: &Vocabulary) -> Vec<TokenId> {
    stream
        .iter()
        .map(|token| vocab.id(token.as_ref()).unwrap_or_else(|| vocab.unk_id()))
        .collect()
}

/// Maps ids back to their tokens.
///
/// Ids outside `[0, vocab.len())` are reported rather than replaced with a placeholder.
pub fn map_to_tokens<'v>(ids: &[TokenId], vocab: &'v Vocabulary) -> Result<Vec<&'v str>> {
    ids.iter()
        .map(|&id| {
            vocab.token(id).ok_or(G2pError::TokenIdOutOfRange {
                id,
                vocab_size: vocab.len(),
            })
        })
        .collect()
}

/// Splits a whitespace-delimited stream and maps it to ids.
#[must_use]
pub fn map_stream_to_ids(stream: &str, vocab: &Vocabulary) -> Vec<TokenId> {
    stream
        .split_whitespace()
        .map(|token| vocab.id(token).unwrap_or_else(|| vocab.unk_id()))
        .collect()
}

/// Counts the tokens of `stream` that are absent from `vocab`.
#[must_use]
pub fn count_unknown<S: AsRef<str>>(stream: &[S], vocab: &Vocabulary) -> usize {
    stream
        .iter()
        .filter(|token| !vocab.contains(token.as_ref()))
        .count()
}

/// Encodes one stream of every record in parallel, preserving record order.
#[must_use]
pub fn encode_records(
    records: &[CorpusRecord],
    vocab: &Vocabulary,
    field: StreamField,
) -> Vec<Vec<TokenId>> {
    records
        .par_iter()
        .map(|record| map_stream_to_ids(field.select(record), vocab))
        .collect()
}
