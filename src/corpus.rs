//! Facilities for discovering input files and reading and writing record corpora.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::{IngestConfig, SplitConfig};
use crate::error::{G2pError, Result};

/// One training sentence as whitespace-delimited phoneme and grapheme token strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// Phoneme stream.
    pub phonemes: String,
    /// Grapheme stream.
    pub graphemes: String,
}

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level. Files inside directories are filtered by
/// [`IngestConfig::extensions`]; paths are returned sorted within each input.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(G2pError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .metadata()
            .map_err(|err| G2pError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let mut found = Vec::new();
            let max_depth = if cfg.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .follow_links(cfg.follow_symlinks)
                .max_depth(max_depth);
            for entry in walker {
                let entry = entry.map_err(|err| G2pError::Internal(err.to_string()))?;
                if entry.file_type().is_file() && cfg.accepts_extension(entry.path()) {
                    found.push(entry.path().to_path_buf());
                }
            }
            found.sort();
            files.extend(found);
        } else if metadata.is_file() {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(G2pError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Parses one JSONL line into a record.
///
/// A missing or non-string `phonemes`/`graphemes` field is an [`G2pError::InvalidRecord`];
/// nothing is defaulted.
pub fn parse_record(line: &str, line_no: usize, path: Option<&Path>) -> Result<CorpusRecord> {
    serde_json::from_str(line).map_err(|err| G2pError::InvalidRecord {
        path: path.map(Path::to_path_buf),
        line: line_no,
        reason: err.to_string(),
    })
}

/// Streams the records of a JSONL file into `visit`, returning the number of records read.
///
/// Blank lines are skipped; the first malformed line aborts the scan.
pub fn visit_records<P, F>(path: P, mut visit: F) -> Result<usize>
where
    P: AsRef<Path>,
    F: FnMut(CorpusRecord),
{
    let path = path.as_ref();
    for_each_line(path, |line, line_no| {
        visit(parse_record(line, line_no, Some(path))?);
        Ok(())
    })
}

/// Reads the non-blank lines of a JSONL file verbatim, checking each parses as a record.
///
/// Fields beyond `phonemes`/`graphemes` survive untouched, which makes this the reader for
/// reshuffling a corpus without rewriting it.
pub fn read_record_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut lines = Vec::new();
    for_each_line(path, |line, line_no| {
        parse_record(line, line_no, Some(path))?;
        lines.push(line.to_owned());
        Ok(())
    })?;
    Ok(lines)
}

/// Feeds every non-blank line to `visit` with its 1-based line number.
///
/// Lines are decoded individually so invalid UTF-8 is reported as an
/// [`G2pError::InvalidRecord`] at the offending line.
fn for_each_line<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(&str, usize) -> Result<()>,
{
    let file = File::open(path).map_err(|err| G2pError::io(err, Some(path.to_path_buf())))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    let mut count = 0usize;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| G2pError::io(err, Some(path.to_path_buf())))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = std::str::from_utf8(&buf).map_err(|err| G2pError::InvalidRecord {
            path: Some(path.to_path_buf()),
            line: line_no,
            reason: err.to_string(),
        })?;
        let line = line.trim_end_matches(|ch: char| ch == '\n' || ch == '\r');
        if line.trim().is_empty() {
            continue;
        }
        visit(line, line_no)?;
        count += 1;
    }
    Ok(count)
}

/// Reads every record of a JSONL file into memory.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<CorpusRecord>> {
    let mut records = Vec::new();
    visit_records(path, |record| records.push(record))?;
    Ok(records)
}

/// Writes records as JSONL, one object per line, without escaping non-ASCII characters.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[CorpusRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|err| G2pError::io(err, Some(path.to_path_buf())))?;
    let mut writer = BufWriter::new(file);
    write_records_to(&mut writer, records)?;
    writer
        .flush()
        .map_err(|err| G2pError::io(err, Some(path.to_path_buf())))
}

/// Writes records as JSONL to an arbitrary writer.
pub fn write_records_to<W: Write>(writer: &mut W, records: &[CorpusRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer
            .write_all(b"\n")
            .map_err(|err| G2pError::io(err, None))?;
    }
    Ok(())
}

/// Writes pre-serialised JSONL lines, one per line.
pub fn write_lines<P, S>(path: P, lines: &[S]) -> Result<()>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let io_err = |err| G2pError::io(err, Some(path.to_path_buf()));
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_ref().as_bytes()).map_err(io_err)?;
        writer.write_all(b"\n").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

/// Loads raw sentences, one per line, from the discovered input files.
///
/// Lines are trimmed and empty lines dropped.
pub fn load_sentences<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<String>> {
    let mut sentences = Vec::new();
    for path in collect_paths(inputs, cfg)? {
        let file =
            File::open(&path).map_err(|err| G2pError::io(err, Some(path.clone())))?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| G2pError::io(err, Some(path.clone())))?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_owned());
            }
        }
    }
    Ok(sentences)
}

/// Shuffles `records` with a seeded RNG and cuts them into `(train, dev)`.
///
/// The training share is `floor(len * train_ratio)`; the same seed always yields the same
/// split for the same input order.
pub fn split_train_dev<T>(mut records: Vec<T>, cfg: &SplitConfig) -> Result<(Vec<T>, Vec<T>)> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    records.shuffle(&mut rng);
    let cutoff = ((records.len() as f64) * cfg.train_ratio).floor() as usize;
    let dev = records.split_off(cutoff.min(records.len()));
    Ok((records, dev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn record(phonemes: &str, graphemes: &str) -> CorpusRecord {
        CorpusRecord {
            phonemes: phonemes.into(),
            graphemes: graphemes.into(),
        }
    }

    #[test]
    fn collect_paths_discovers_files_recursively() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_a = dir.path().join("a.txt");
        let file_b = nested.join("b.txt");
        let file_c = nested.join("c.bin");
        fs::write(&file_a, "a").expect("write a");
        fs::write(&file_b, "b").expect("write b");
        fs::write(&file_c, "c").expect("write c");

        let cfg = IngestConfig::builder().extensions(["txt"]).build();
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        assert_eq!(paths, vec![file_a.clone(), file_b]);

        let shallow = IngestConfig::builder().recursive(false).build();
        let paths = collect_paths(&[dir.path()], &shallow).expect("collect shallow");
        assert_eq!(paths, vec![file_a]);
    }

    #[test]
    fn collect_paths_rejects_missing_input() {
        let dir = tempdir().expect("tempdir");
        let err = collect_paths(&[dir.path().join("missing")], &IngestConfig::default())
            .expect_err("missing path");
        assert!(matches!(err, G2pError::InvalidConfig(_)));
    }

    #[test]
    fn parse_record_requires_both_fields() {
        let ok = parse_record(r#"{"phonemes":"a","graphemes":"a","extra":1}"#, 1, None)
            .expect("extra fields are ignored");
        assert_eq!(ok, record("a", "a"));
        for bad in [
            r#"{"phonemes":"a"}"#,
            r#"{"graphemes":"a"}"#,
            r#"{"phonemes":null,"graphemes":"a"}"#,
            "not json",
        ] {
            let err = parse_record(bad, 7, None).expect_err("malformed record");
            assert!(matches!(err, G2pError::InvalidRecord { line: 7, .. }));
        }
    }

    #[test]
    fn records_round_trip_through_jsonl() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("all.jsonl");
        let records = vec![record("s oː", "s oo"), record("ʕ a l i", "C a l i")];
        write_records(&path, &records).expect("write records");
        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("oː"), "non-ASCII stays unescaped");
        assert_eq!(read_records(&path).expect("read records"), records);
    }

    #[test]
    fn invalid_utf8_is_an_invalid_record() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.jsonl");
        let mut raw = b"{\"phonemes\":\"a\",\"graphemes\":\"a\"}\n".to_vec();
        raw.extend_from_slice(b"{\"phonemes\":\"\xff\",\"graphemes\":\"a\"}\n");
        fs::write(&path, raw).expect("write");
        let err = read_records(&path).expect_err("invalid utf-8");
        assert!(
            matches!(&err, G2pError::InvalidRecord { line: 2, path: Some(p), .. } if *p == path),
            "{err:?}"
        );
    }

    #[test]
    fn record_lines_keep_extra_fields() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("all.jsonl");
        fs::write(
            &path,
            "{\"phonemes\":\"a\",\"graphemes\":\"a\",\"id\":7}\r\n\n{\"phonemes\":\"b\",\"graphemes\":\"b\"}",
        )
        .expect("write");
        let lines = read_record_lines(&path).expect("read lines");
        assert_eq!(
            lines,
            vec![
                r#"{"phonemes":"a","graphemes":"a","id":7}"#,
                r#"{"phonemes":"b","graphemes":"b"}"#,
            ]
        );

        let out = dir.path().join("copy.jsonl");
        write_lines(&out, &lines).expect("write lines");
        assert_eq!(read_record_lines(&out).expect("reread"), lines);

        fs::write(&path, "{\"phonemes\":\"a\"}\n").expect("write");
        assert!(matches!(
            read_record_lines(&path),
            Err(G2pError::InvalidRecord { line: 1, .. })
        ));
    }

    #[test]
    fn load_sentences_skips_blank_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("text.txt");
        fs::write(&path, "Soo dhawoow\n\n   \n  Sidee tahay? \n").expect("write");
        let sentences = load_sentences(&[&path], &IngestConfig::default()).expect("load");
        assert_eq!(sentences, vec!["Soo dhawoow", "Sidee tahay?"]);
    }

    #[test]
    fn split_is_seeded_and_complete() {
        let items: Vec<usize> = (0..100).collect();
        let cfg = SplitConfig {
            train_ratio: 0.9,
            seed: 7,
        };
        let (train, dev) = split_train_dev(items.clone(), &cfg).expect("split");
        assert_eq!(train.len(), 90);
        assert_eq!(dev.len(), 10);
        let (train_again, dev_again) = split_train_dev(items.clone(), &cfg).expect("split");
        assert_eq!(train, train_again);
        assert_eq!(dev, dev_again);
        let mut all: Vec<usize> = train.into_iter().chain(dev).collect();
        all.sort_unstable();
        assert_eq!(all, items);
    }
}
