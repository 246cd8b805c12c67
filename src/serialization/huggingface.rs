//! Hugging Face compatible serialisation helpers built on top of `tokenizers`.
//!
//! A vocabulary is exported as a `WordLevel` model over whitespace-split input, with `<unk>` as
//! the fallback token and the reserved tokens registered as special tokens.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use tokenizers::models::wordlevel::WordLevel;
use tokenizers::pre_tokenizers::whitespace::WhitespaceSplit;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::tokenizer::AddedToken;
use tokenizers::Tokenizer;

use crate::error::{G2pError, Result};
use crate::serialization::token_map::vocabulary_from_map;
use crate::special_tokens::{RESERVED, UNK};
use crate::vocab::{TokenId, Vocabulary};

/// Builds a Hugging Face tokenizer equivalent to the vocabulary.
pub fn as_tokenizer(vocab: &Vocabulary) -> Result<Tokenizer> {
    let map: AHashMap<String, TokenId> = vocab
        .tokens()
        .iter()
        .enumerate()
        .map(|(idx, token)| (token.clone(), idx as TokenId))
        .collect();
    let model = WordLevel::builder()
        .vocab(map)
        .unk_token(UNK.to_owned())
        .build()?;
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Some(PreTokenizerWrapper::WhitespaceSplit(WhitespaceSplit)));

    let added = RESERVED
        .iter()
        .map(|&token| AddedToken::from(token, true))
        .collect::<Vec<_>>();
    tokenizer.add_special_tokens(&added);
    Ok(tokenizer)
}

/// Serialises the vocabulary to a `tokenizer.json` string.
pub fn tokenizer_json(vocab: &Vocabulary, pretty: bool) -> Result<String> {
    let tokenizer = as_tokenizer(vocab)?;
    tokenizer
        .to_string(pretty)
        .map_err(|err| G2pError::Tokenizers(err.to_string()))
}

/// Persists the vocabulary as `tokenizer.json` compatible with Hugging Face tooling.
pub fn save_huggingface_tokenizer<P: AsRef<Path>>(
    vocab: &Vocabulary,
    path: P,
    pretty: bool,
) -> Result<()> {
    let json = tokenizer_json(vocab, pretty)?;
    fs::write(path.as_ref(), json)
        .map_err(|err| G2pError::io(err, Some(path.as_ref().to_path_buf())))
}

/// Loads a vocabulary back from a `tokenizer.json` file.
pub fn load_huggingface_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let path = path.as_ref();
    let tokenizer = Tokenizer::from_file(path)
        .map_err(|err| G2pError::vocabulary_load(path, err.to_string()))?;
    vocabulary_from_map(tokenizer.get_vocab(true))
        .map_err(|err| G2pError::vocabulary_load(path, err.to_string()))
}
