//! JSON token map artifact: a single object mapping every token to its id.
//!
//! Keys are written in sorted order so re-serialising the same vocabulary is byte-identical.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{G2pError, Result};
use crate::vocab::{TokenId, Vocabulary};

/// Serialises the vocabulary to a JSON object string.
pub fn token_map_json(vocab: &Vocabulary, pretty: bool) -> Result<String> {
    let map = vocab.to_token_map();
    if pretty {
        Ok(serde_json::to_string_pretty(&map)?)
    } else {
        Ok(serde_json::to_string(&map)?)
    }
}

/// Writes the vocabulary to `path` in one scoped write.
pub fn save_vocabulary<P: AsRef<Path>>(vocab: &Vocabulary, path: P, pretty: bool) -> Result<()> {
    let json = token_map_json(vocab, pretty)?;
    fs::write(path.as_ref(), json)
        .map_err(|err| G2pError::io(err, Some(path.as_ref().to_path_buf())))
}

/// Reads and validates a token map written by [`save_vocabulary`].
///
/// Every failure, including a missing file, is a [`G2pError::VocabularyLoad`]; the caller is
/// never handed a rebuilt vocabulary in place of the persisted one.
pub fn load_vocabulary<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|err| G2pError::vocabulary_load(path, err.to_string()))?;
    let map: BTreeMap<String, TokenId> = serde_json::from_str(&raw)
        .map_err(|err| G2pError::vocabulary_load(path, err.to_string()))?;
    vocabulary_from_map(map).map_err(|err| G2pError::vocabulary_load(path, err.to_string()))
}

/// Orders a token to id map by id, requiring ids to be dense from zero.
pub(crate) fn vocabulary_from_map<I>(entries: I) -> Result<Vocabulary>
where
    I: IntoIterator<Item = (String, TokenId)>,
{
    let mut entries: Vec<(String, TokenId)> = entries.into_iter().collect();
    entries.sort_by_key(|(_, id)| *id);
    for (expected, (token, id)) in entries.iter().enumerate() {
        if *id as usize != expected {
            return Err(G2pError::InvalidConfig(format!(
                "token {token:?} has id {id}, expected {expected}; ids must be dense and unique"
            )));
        }
    }
    Vocabulary::from_ordered_tokens(entries.into_iter().map(|(token, _)| token).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusRecord;
    use crate::vocab::build_vocabulary;
    use tempfile::tempdir;

    fn sample_vocab() -> Vocabulary {
        build_vocabulary(&[CorpusRecord {
            phonemes: "s oː _ ð a w oː w".into(),
            graphemes: "s oo _ dh a w oo w".into(),
        }])
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("token_maps.json");
        let vocab = sample_vocab();
        save_vocabulary(&vocab, &path, false).expect("save");
        let loaded = load_vocabulary(&path).expect("load");
        assert_eq!(loaded, vocab);
    }

    #[test]
    fn serialisation_is_reproducible() {
        let first = token_map_json(&sample_vocab(), true).expect("json");
        let second = token_map_json(&sample_vocab(), true).expect("json");
        assert_eq!(first, second);
        assert!(first.contains("\"<pad>\": 0"));
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let dir = tempdir().expect("tempdir");
        let err = load_vocabulary(dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, G2pError::VocabularyLoad { .. }));
    }

    #[test]
    fn invalid_contents_are_load_failures() {
        let dir = tempdir().expect("tempdir");
        let cases = [
            ("garbage.json", "not json"),
            ("gap.json", r#"{"<pad>":0,"<mask>":1,"<unk>":2,"a":4}"#),
            ("dup.json", r#"{"<pad>":0,"<mask>":1,"<unk>":2,"a":2}"#),
            ("order.json", r#"{"<mask>":0,"<pad>":1,"<unk>":2}"#),
        ];
        for (name, contents) in cases {
            let path = dir.path().join(name);
            fs::write(&path, contents).expect("write");
            let err = load_vocabulary(&path).expect_err(name);
            assert!(
                matches!(err, G2pError::VocabularyLoad { .. }),
                "{name}: {err}"
            );
        }
    }
}
