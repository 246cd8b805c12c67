use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SENTENCES: &str = "Soo dhawoow\nWaa maxay magacaagu\n\nMaallin wanaagsan\n";

fn temp_workspace() -> TempDir {
    tempfile::tempdir().expect("create tempdir")
}

fn sog2p(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sog2p").expect("binary exists");
    cmd.current_dir(workdir);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf-8 stdout")
}

fn prepare_corpus(workspace: &TempDir) {
    fs::write(workspace.path().join("sentences.txt"), SENTENCES).expect("write sentences");
    sog2p(workspace.path())
        .args(["--quiet", "phonemize", "sentences.txt", "-o", "all.jsonl"])
        .assert()
        .success();
    sog2p(workspace.path())
        .args([
            "--quiet",
            "build-vocab",
            "all.jsonl",
            "-o",
            "token_maps.json",
            "--huggingface",
            "tokenizer.json",
            "--no-progress",
        ])
        .assert()
        .success();
}

#[test]
fn phonemize_writes_one_record_per_sentence() {
    let workspace = temp_workspace();
    prepare_corpus(&workspace);

    let raw = fs::read_to_string(workspace.path().join("all.jsonl")).expect("read records");
    let records: Vec<Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["phonemes"], "s oː _ ð a w oː w");
    assert_eq!(records[0]["graphemes"], "S oo _ dh a w oo w");
    assert_eq!(records[2]["phonemes"], "m aː l l i n _ w a n aː ɡ s a n");
}

#[test]
fn phonemize_text_goes_to_stdout() {
    let workspace = temp_workspace();
    let stdout = stdout_of(sog2p(workspace.path()).args([
        "--quiet",
        "phonemize",
        "--text",
        "waa maxay",
    ]));
    let record: Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    assert_eq!(record["phonemes"], "w aː _ m a ħ a j");
    assert_eq!(record["graphemes"], "w aa _ m a x a y");
}

#[test]
fn build_encode_decode_round_trip() {
    let workspace = temp_workspace();
    prepare_corpus(&workspace);

    let map: Value = serde_json::from_str(
        &fs::read_to_string(workspace.path().join("token_maps.json")).expect("read token map"),
    )
    .expect("token map is JSON");
    assert_eq!(map["<pad>"], 0);
    assert_eq!(map["<mask>"], 1);
    assert_eq!(map["<unk>"], 2);
    assert!(map.get("_").is_some());

    let encoded = stdout_of(sog2p(workspace.path()).args([
        "--quiet",
        "encode",
        "-m",
        "token_maps.json",
        "--text",
        "soo dhawoow",
        "--json",
    ]));
    let encoded: Value = serde_json::from_str(encoded.trim()).expect("encoded JSON");
    assert_eq!(encoded["phonemes"], "s oː _ ð a w oː w");
    let ids = encoded["ids"]
        .as_array()
        .expect("ids array")
        .iter()
        .map(|v| v.as_u64().expect("u64 id").to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids.len(), 8);
    assert!(ids.iter().all(|id| id != "2"), "all tokens are known");

    let mut decode = sog2p(workspace.path());
    decode.args(["--quiet", "decode", "-m", "token_maps.json"]);
    decode.args(&ids);
    let decoded = stdout_of(&mut decode);
    assert_eq!(decoded.trim(), "s oː _ ð a w oː w");
}

#[test]
fn encode_maps_unknown_tokens_to_unk() {
    let workspace = temp_workspace();
    prepare_corpus(&workspace);

    let stdout = stdout_of(sog2p(workspace.path()).args([
        "--quiet",
        "encode",
        "-m",
        "token_maps.json",
        "--text",
        "qq",
    ]));
    assert_eq!(stdout.trim(), "2 2");
}

#[test]
fn decode_rejects_out_of_range_ids() {
    let workspace = temp_workspace();
    prepare_corpus(&workspace);

    sog2p(workspace.path())
        .args(["--quiet", "decode", "-m", "token_maps.json", "100000"])
        .assert()
        .failure();
}

#[test]
fn info_reads_both_artifact_formats() {
    let workspace = temp_workspace();
    prepare_corpus(&workspace);

    let from_map = stdout_of(sog2p(workspace.path()).args([
        "--quiet",
        "info",
        "-m",
        "token_maps.json",
        "--json",
    ]));
    let from_hf = stdout_of(sog2p(workspace.path()).args([
        "--quiet",
        "info",
        "-m",
        "tokenizer.json",
        "--json",
    ]));
    let from_map: Value = serde_json::from_str(&from_map).expect("info JSON");
    let from_hf: Value = serde_json::from_str(&from_hf).expect("info JSON");
    assert_eq!(from_map["vocab_size"], from_hf["vocab_size"]);
    assert_eq!(from_map["unk_id"], 2);

    let text =
        stdout_of(sog2p(workspace.path()).args(["--quiet", "info", "-m", "token_maps.json"]));
    assert!(text.contains("Vocab size"));
}

#[test]
fn info_fails_on_missing_vocabulary() {
    let workspace = temp_workspace();
    sog2p(workspace.path())
        .args(["--quiet", "info", "-m", "absent.json"])
        .assert()
        .failure();
}

#[test]
fn build_vocab_rejects_malformed_records() {
    let workspace = temp_workspace();
    fs::write(
        workspace.path().join("bad.jsonl"),
        "{\"phonemes\":\"a\",\"graphemes\":\"a\"}\n{\"phonemes\":\"a\"}\n",
    )
    .expect("write records");
    sog2p(workspace.path())
        .args(["--quiet", "build-vocab", "bad.jsonl", "--no-progress"])
        .assert()
        .failure();
    assert!(!workspace.path().join("token_maps.json").exists());
}

#[test]
fn split_is_deterministic() {
    let workspace = temp_workspace();
    let lines = (0..40)
        .map(|i| format!("{{\"phonemes\":\"p{i}\",\"graphemes\":\"g{i}\",\"source\":\"s{i}\"}}"))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(workspace.path().join("all.jsonl"), lines).expect("write corpus");

    for dir in ["first", "second"] {
        sog2p(workspace.path())
            .args([
                "--quiet",
                "split",
                "all.jsonl",
                "--train-ratio",
                "0.75",
                "--seed",
                "3",
                "-o",
                dir,
            ])
            .assert()
            .success();
    }

    let read = |dir: &str, name: &str| {
        fs::read_to_string(workspace.path().join(dir).join(name)).expect("read split")
    };
    assert_eq!(read("first", "train.jsonl").lines().count(), 30);
    assert_eq!(read("first", "dev.jsonl").lines().count(), 10);
    assert_eq!(read("first", "train.jsonl"), read("second", "train.jsonl"));
    assert_eq!(read("first", "dev.jsonl"), read("second", "dev.jsonl"));
    for line in read("first", "dev.jsonl").lines() {
        let record: Value = serde_json::from_str(line).expect("dev record");
        assert!(record["source"].is_string(), "extra fields survive the split");
    }
}

#[test]
fn reserved_separator_is_rejected() {
    let workspace = temp_workspace();
    sog2p(workspace.path())
        .args(["--quiet", "phonemize", "--text", "waa maxay", "--separator", "<pad>"])
        .assert()
        .failure();
}

#[test]
fn rules_prints_default_table() {
    let workspace = temp_workspace();
    let stdout = stdout_of(sog2p(workspace.path()).args(["--quiet", "rules"]));
    let table: Value = serde_json::from_str(&stdout).expect("rules JSON");
    assert_eq!(table["digraphs"]["sh"], "ʃ");
    assert_eq!(table["long_vowels"]["aa"], "aː");
    assert_eq!(table["singles"]["x"], "ħ");
}
