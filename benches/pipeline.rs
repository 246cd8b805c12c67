use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sog2p::vocab::build_vocabulary_par;
use sog2p::{CorpusRecord, SentenceTokenizer};

const WORDS: &[&str] = &[
    "soo", "dhawoow", "maallin", "wanaagsan", "magacaagu", "waa", "maxay", "shaqo", "khamiis",
    "Soomaaliya", "caano", "xoolaha", "geel", "dhul", "yaryar", "jaamacadda",
];

fn build_sentences(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            (0..12)
                .map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_phonemize(c: &mut Criterion) {
    let tokenizer = SentenceTokenizer::default();
    let mut group = c.benchmark_group("phonemize_batch");
    for count in [1_000usize, 10_000] {
        let sentences = build_sentences(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &sentences, |b, s| {
            b.iter(|| black_box(tokenizer.phonemize_batch(s)));
        });
    }
    group.finish();
}

fn bench_vocabulary(c: &mut Criterion) {
    let tokenizer = SentenceTokenizer::default();
    let records: Vec<CorpusRecord> = tokenizer
        .phonemize_batch(&build_sentences(10_000))
        .iter()
        .map(|sentence| sentence.to_record())
        .collect();

    let mut group = c.benchmark_group("build_vocabulary");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("records_10k", |b| {
        b.iter(|| black_box(build_vocabulary_par(&records)));
    });
    group.finish();
}

criterion_group!(benches, bench_phonemize, bench_vocabulary);
criterion_main!(benches);
