//! Counters describing a vocabulary build.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Aggregate metrics produced by a vocabulary build.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildMetrics {
    /// Record files scanned; zero for in-memory builds.
    pub files: usize,
    /// Corpus records consumed.
    pub records: usize,
    /// Token occurrences across both streams of every record, separators included.
    pub token_occurrences: usize,
    /// Final vocabulary size including the reserved tokens.
    pub vocab_size: usize,
    /// Wall-clock duration of the build.
    pub duration: Duration,
}

impl BuildMetrics {
    /// Mean number of tokens per record, or zero for an empty corpus.
    #[must_use]
    pub fn mean_tokens_per_record(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.token_occurrences as f64 / self.records as f64
        }
    }
}
