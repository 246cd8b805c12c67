//! Configuration builders controlling sentence tokenization, corpus ingestion and splitting.

use crate::error::{G2pError, Result};
use crate::special_tokens::is_reserved;
use serde::{Deserialize, Serialize};

/// Default word separator token placed between words in both streams.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Configuration for [`SentenceTokenizer`](crate::sentence::SentenceTokenizer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Token inserted between words in the phoneme and grapheme streams.
    pub separator: String,
    /// Lowercases words before grapheme segmentation. Off by default so grapheme tokens keep
    /// the surface spelling that existing vocabularies were built from.
    pub lowercase_graphemes: bool,
}

impl TokenizerConfig {
    /// Returns a builder initialised with [`TokenizerConfig::default`].
    #[must_use]
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    /// Validates the invariants required for tokenization.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(G2pError::InvalidConfig(
                "separator must not be empty".into(),
            ));
        }
        if self.separator.chars().any(char::is_whitespace) {
            return Err(G2pError::InvalidConfig(format!(
                "separator {:?} must not contain whitespace",
                self.separator
            )));
        }
        if is_reserved(&self.separator) {
            return Err(G2pError::InvalidConfig(format!(
                "separator {:?} collides with a reserved token",
                self.separator
            )));
        }
        Ok(())
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.into(),
            lowercase_graphemes: false,
        }
    }
}

/// Builder for [`TokenizerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TokenizerBuilder {
    cfg: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Creates a builder with [`TokenizerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the word separator token.
    #[must_use]
    pub fn separator(mut self, value: impl Into<String>) -> Self {
        self.cfg.separator = value.into();
        self
    }

    /// Enables or disables lowercasing of grapheme tokens.
    #[must_use]
    pub fn lowercase_graphemes(mut self, enabled: bool) -> Self {
        self.cfg.lowercase_graphemes = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TokenizerConfig`].
    pub fn build(self) -> Result<TokenizerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how input files are discovered on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
    /// Restricts directory traversal to files with one of these extensions (no leading dot).
    /// Files named explicitly are always accepted.
    pub extensions: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            extensions: Vec::new(),
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }

    pub(crate) fn accepts_extension(&self, path: &std::path::Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Limits directory traversal to the given file extensions.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_owned())
            .collect();
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}

/// Configuration for the seeded train/dev split of a record corpus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SplitConfig {
    /// Fraction of records assigned to the training split.
    pub train_ratio: f64,
    /// Seed for the deterministic shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.95,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Validates that the ratio lies in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.train_ratio) {
            return Err(G2pError::InvalidConfig(format!(
                "train_ratio ({}) must lie within [0, 1]",
                self.train_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn tokenizer_builder_rejects_whitespace_separator() {
        let err = TokenizerConfig::builder()
            .separator(" ")
            .build()
            .expect_err("whitespace separator");
        assert!(matches!(
            err,
            G2pError::InvalidConfig(message) if message.contains("whitespace")
        ));
        assert!(TokenizerConfig::builder().separator("").build().is_err());
    }

    #[test]
    fn tokenizer_builder_rejects_reserved_separator() {
        for reserved in ["<pad>", "<mask>", "<unk>"] {
            let err = TokenizerConfig::builder()
                .separator(reserved)
                .build()
                .expect_err("reserved separator");
            assert!(matches!(
                err,
                G2pError::InvalidConfig(message) if message.contains("reserved")
            ));
        }
    }

    #[test]
    fn tokenizer_builder_overrides_defaults() {
        let cfg = TokenizerConfig::builder()
            .separator("|")
            .lowercase_graphemes(true)
            .build()
            .expect("valid config");
        assert_eq!(cfg.separator, "|");
        assert!(cfg.lowercase_graphemes);
        assert_eq!(TokenizerConfig::default().separator, DEFAULT_SEPARATOR);
    }

    #[test]
    fn ingest_builder_normalises_extensions() {
        let cfg = IngestConfig::builder()
            .recursive(false)
            .follow_symlinks(true)
            .extensions([".txt", "jsonl"])
            .build();
        assert!(!cfg.recursive);
        assert!(cfg.follow_symlinks);
        assert!(cfg.accepts_extension(Path::new("a/b.txt")));
        assert!(cfg.accepts_extension(Path::new("b.jsonl")));
        assert!(!cfg.accepts_extension(Path::new("b.bin")));
        assert!(IngestConfig::default().accepts_extension(Path::new("b.bin")));
    }

    #[test]
    fn split_config_validates_ratio() {
        assert!(SplitConfig::default().validate().is_ok());
        let cfg = SplitConfig {
            train_ratio: 1.5,
            ..SplitConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
