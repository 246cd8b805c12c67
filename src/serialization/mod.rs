//! Helpers for persisting vocabularies as JSON token maps and Hugging Face tokenizers.

pub mod huggingface;
pub mod token_map;

pub use huggingface::{
    as_tokenizer, load_huggingface_vocabulary, save_huggingface_tokenizer, tokenizer_json,
};
pub use token_map::{load_vocabulary, save_vocabulary, token_map_json};
