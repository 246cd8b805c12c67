use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::ThreadPoolBuilder;
use serde_json::json;
use sog2p::config::{IngestConfig, SplitConfig, TokenizerConfig};
use sog2p::corpus::{self, CorpusRecord};
use sog2p::mapper::{count_unknown, map_to_ids, map_to_tokens};
use sog2p::rules::RuleTable;
use sog2p::sentence::SentenceTokenizer;
use sog2p::serialization;
use sog2p::vocab::{TokenId, Vocabulary, VocabularyBuilder};

const DEFAULT_VOCAB_OUTPUT: &str = "token_maps.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Somali G2P and PL-BERT vocabulary toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Phonemize text files (one sentence per line) into JSONL records
    Phonemize(PhonemizeArgs),
    /// Build a token map from phoneme/grapheme JSONL records
    BuildVocab(BuildVocabArgs),
    /// Split a JSONL corpus into train.jsonl and dev.jsonl
    Split(SplitArgs),
    /// Encode sentences into phoneme token ids
    Encode(EncodeArgs),
    /// Decode token ids back into tokens
    Decode(DecodeArgs),
    /// Inspect a token map
    Info(InfoArgs),
    /// Print the active rule table as JSON
    Rules(RulesArgs),
}

#[derive(Args, Debug, Default)]
struct TokenizerArgs {
    /// JSON rule table overriding the built-in Somali rules
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Word separator token
    #[arg(long, value_name = "TOKEN")]
    separator: Option<String>,

    /// Lowercase words before grapheme segmentation
    #[arg(long)]
    lowercase_graphemes: bool,
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,

    /// Only read files with this extension inside directories (repeat flag)
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,
}

#[derive(Args, Debug)]
struct PhonemizeArgs {
    /// Text files or directories to read
    #[arg(required_unless_present = "text")]
    inputs: Vec<PathBuf>,

    /// Phonemize a single sentence instead of files
    #[arg(long, value_name = "SENTENCE")]
    text: Option<String>,

    /// Output JSONL path (defaults to stdout)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    ingest: IngestArgs,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct BuildVocabArgs {
    /// JSONL record files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the token map
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_VOCAB_OUTPUT)]
    output: PathBuf,

    /// Also write a Hugging Face tokenizer.json
    #[arg(long, value_name = "PATH")]
    huggingface: Option<PathBuf>,

    /// Emit pretty JSON
    #[arg(long)]
    pretty: bool,

    /// Disable the progress spinner
    #[arg(long)]
    no_progress: bool,

    #[command(flatten)]
    ingest: IngestArgs,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// JSONL corpus to split
    input: PathBuf,

    /// Fraction of records assigned to train.jsonl
    #[arg(long, value_name = "RATIO", default_value_t = 0.95)]
    train_ratio: f64,

    /// Shuffle seed
    #[arg(long, value_name = "SEED", default_value_t = 42)]
    seed: u64,

    /// Output directory for train.jsonl and dev.jsonl
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Token map (or tokenizer.json) to load
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Text files with one sentence per line
    #[arg(required_unless_present = "text")]
    inputs: Vec<PathBuf>,

    /// Encode a single sentence instead of files
    #[arg(long, value_name = "SENTENCE")]
    text: Option<String>,

    /// Emit JSON lines instead of whitespace separated ids
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    tokenizer: TokenizerArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Token map (or tokenizer.json) to load
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Path to whitespace separated token ids
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Token ids to decode when --input is omitted
    #[arg(value_name = "ID", required_unless_present = "input")]
    tokens: Vec<TokenId>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Token map (or tokenizer.json) to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    vocab: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RulesArgs {
    /// JSON rule table to validate and print instead of the built-in one
    #[arg(long, value_name = "PATH")]
    rules: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Phonemize(args) => run_phonemize(args),
        Commands::BuildVocab(args) => run_build_vocab(args),
        Commands::Split(args) => run_split(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Info(args) => run_info(args),
        Commands::Rules(args) => run_rules(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Info,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp_millis()
        .try_init()
        .ok();
}

fn configure_threads(threads: Option<usize>) -> Result<()> {
    if let Some(threads) = threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }
    Ok(())
}

fn ingest_config(args: &IngestArgs) -> IngestConfig {
    IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .extensions(args.extensions.iter().cloned())
        .build()
}

fn build_tokenizer(args: &TokenizerArgs) -> Result<SentenceTokenizer> {
    let rules = match &args.rules {
        Some(path) => RuleTable::from_json_file(path)
            .with_context(|| format!("failed to load rule table from {}", path.display()))?,
        None => RuleTable::somali(),
    };
    let mut cfg = TokenizerConfig::builder().lowercase_graphemes(args.lowercase_graphemes);
    if let Some(separator) = &args.separator {
        cfg = cfg.separator(separator.clone());
    }
    Ok(SentenceTokenizer::new(rules, cfg.build()?)?)
}

fn load_any_vocabulary(path: &Path) -> Result<Vocabulary> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_huggingface = serde_json::from_str::<serde_json::Value>(&raw)
        .map(|value| value.get("model").is_some_and(serde_json::Value::is_object))
        .unwrap_or(false);
    let vocab = if is_huggingface {
        serialization::load_huggingface_vocabulary(path)?
    } else {
        serialization::load_vocabulary(path)?
    };
    Ok(vocab)
}

fn read_sentences(
    inputs: &[PathBuf],
    text: Option<&str>,
    ingest: &IngestConfig,
) -> Result<Vec<String>> {
    let mut sentences = Vec::new();
    if let Some(text) = text {
        sentences.push(text.to_owned());
    }
    if !inputs.is_empty() {
        sentences.extend(
            corpus::load_sentences(inputs, ingest).context("failed to load input sentences")?,
        );
    }
    Ok(sentences)
}

fn run_phonemize(args: PhonemizeArgs) -> Result<()> {
    configure_threads(args.threads)?;
    let tokenizer = build_tokenizer(&args.tokenizer)?;
    let ingest = ingest_config(&args.ingest);
    let sentences = read_sentences(&args.inputs, args.text.as_deref(), &ingest)?;

    let start = Instant::now();
    let records: Vec<CorpusRecord> = tokenizer
        .phonemize_batch(&sentences)
        .into_iter()
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| sentence.to_record())
        .collect();
    info!(
        "phonemized {} sentences into {} records in {:.2?}",
        sentences.len(),
        records.len(),
        start.elapsed()
    );

    match &args.output {
        Some(path) => {
            corpus::write_records(path, &records)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} records to {}", records.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            corpus::write_records_to(&mut writer, &records)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn run_build_vocab(args: BuildVocabArgs) -> Result<()> {
    configure_threads(args.threads)?;
    let builder = VocabularyBuilder::new(ingest_config(&args.ingest));

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} collecting tokens... {elapsed}")
            .context("invalid progress template")?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let artifacts = builder
        .build_from_paths(&args.inputs)
        .with_context(|| "failed to build vocabulary")?;
    if let Some(pb) = spinner {
        pb.finish_with_message("vocabulary complete");
    }

    serialization::save_vocabulary(&artifacts.vocab, &args.output, args.pretty)
        .with_context(|| format!("failed to save token map to {}", args.output.display()))?;
    if let Some(path) = &args.huggingface {
        serialization::save_huggingface_tokenizer(&artifacts.vocab, path, args.pretty)
            .with_context(|| format!("failed to save tokenizer to {}", path.display()))?;
        info!("wrote Hugging Face tokenizer to {}", path.display());
    }

    let metrics = &artifacts.metrics;
    println!(
        "wrote vocabulary of {} tokens to {}",
        artifacts.vocab.len(),
        args.output.display()
    );
    println!(
        "   files {} | records {} | tokens/record {:.1} | duration {:.2?}",
        metrics.files,
        metrics.records,
        metrics.mean_tokens_per_record(),
        metrics.duration
    );
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    let records = corpus::read_record_lines(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let cfg = SplitConfig {
        train_ratio: args.train_ratio,
        seed: args.seed,
    };
    let (train, dev) = corpus::split_train_dev(records, &cfg)?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;
    let train_path = args.output.join("train.jsonl");
    let dev_path = args.output.join("dev.jsonl");
    corpus::write_lines(&train_path, &train)?;
    corpus::write_lines(&dev_path, &dev)?;
    info!(
        "wrote {} training and {} dev records to {}",
        train.len(),
        dev.len(),
        args.output.display()
    );
    println!("train {} | dev {}", train.len(), dev.len());
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let vocab = load_any_vocabulary(&args.vocab)
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;
    let tokenizer = build_tokenizer(&args.tokenizer)?;
    let sentences = read_sentences(&args.inputs, args.text.as_deref(), &IngestConfig::default())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (sentence, phonemized) in sentences.iter().zip(tokenizer.phonemize_batch(&sentences)) {
        let ids = map_to_ids(&phonemized.phonemes, &vocab);
        let unknown = count_unknown(&phonemized.phonemes, &vocab);
        if unknown > 0 {
            warn!("{unknown} unknown tokens mapped to <unk> in {sentence:?}");
        }
        if args.json {
            let record = json!({
                "text": sentence,
                "phonemes": phonemized.phonemes.join(" "),
                "ids": ids,
            });
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        } else {
            let line = ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let vocab = load_any_vocabulary(&args.vocab)
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;

    let ids = if let Some(input_path) = &args.input {
        let contents = fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        parse_token_list(&contents)?
    } else {
        args.tokens
    };

    let tokens = map_to_tokens(&ids, &vocab)?;
    println!("{}", tokens.join(" "));
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let vocab = load_any_vocabulary(&args.vocab)
        .with_context(|| format!("failed to load vocabulary from {}", args.vocab.display()))?;
    let summary = json!({
        "path": args.vocab.display().to_string(),
        "vocab_size": vocab.len(),
        "pad_id": vocab.pad_id(),
        "mask_id": vocab.mask_id(),
        "unk_id": vocab.unk_id(),
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let preview = vocab
            .tokens()
            .iter()
            .skip(3)
            .take(16)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        println!("Vocab size   : {}", vocab.len());
        println!(
            "Reserved ids : <pad>={} <mask>={} <unk>={}",
            vocab.pad_id(),
            vocab.mask_id(),
            vocab.unk_id()
        );
        println!("First tokens : {preview}");
    }
    Ok(())
}

fn run_rules(args: RulesArgs) -> Result<()> {
    let rules = match &args.rules {
        Some(path) => RuleTable::from_json_file(path)
            .with_context(|| format!("failed to load rule table from {}", path.display()))?,
        None => RuleTable::somali(),
    };
    println!("{}", serde_json::to_string_pretty(&rules.to_spec())?);
    Ok(())
}

fn parse_token_list(contents: &str) -> Result<Vec<TokenId>> {
    let mut ids = Vec::new();
    for raw in contents.split_whitespace() {
        match raw.parse::<TokenId>() {
            Ok(id) => ids.push(id),
            Err(err) => bail!("invalid token id {raw:?}: {err}"),
        }
    }
    Ok(ids)
}
