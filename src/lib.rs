//! Rule-based Somali grapheme-to-phoneme transducer and deterministic vocabulary builder.
//!
//! The crate turns orthographic Somali text into aligned phoneme and grapheme token streams,
//! builds a closed integer vocabulary over a corpus of such streams, and maps streams to ids
//! for masked-language-model training and speech-synthesis frontends. Vocabulary ids depend
//! only on the set of tokens observed, never on corpus order or parallelism. A `sog2p` command
//! line interface wraps the library.
//!
//! ```no_run
//! use sog2p::{map_to_ids, RuleTable, SentenceTokenizer, TokenizerConfig, VocabularyBuilder};
//!
//! # fn main() -> sog2p::Result<()> {
//! let tokenizer = SentenceTokenizer::new(RuleTable::somali(), TokenizerConfig::default())?;
//! let sentence = tokenizer.phonemize_sentence("Soo dhawoow");
//! let artifacts = VocabularyBuilder::default().build_from_paths(&["data/all.jsonl"])?;
//! let ids = map_to_ids(&sentence.phonemes, &artifacts.vocab);
//! sog2p::serialization::save_vocabulary(&artifacts.vocab, "token_maps.json", false)?;
//! # let _ = ids;
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature. Users targeting the library only
//! can disable default features: `sog2p = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod mapper;
pub mod metrics;
pub mod rules;
pub mod sentence;
pub mod serialization;
pub mod special_tokens;
pub mod transducer;
pub mod vocab;

pub use config::{IngestConfig, SplitConfig, TokenizerBuilder, TokenizerConfig};
pub use corpus::CorpusRecord;
pub use error::{G2pError, Result};
pub use mapper::{encode_records, map_to_ids, map_to_tokens, StreamField};
pub use metrics::BuildMetrics;
pub use rules::{RuleKind, RuleTable};
pub use sentence::{phonemize_sentence, PhonemizedSentence, SentenceTokenizer};
pub use transducer::{word_to_graphemes, word_to_phonemes};
pub use vocab::{
    build_vocabulary, build_vocabulary_par, BuildArtifacts, TokenId, TokenSet, Vocabulary,
    VocabularyBuilder,
};
