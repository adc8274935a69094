//! Criterion benchmarks for Speliuk.
//!
//! Covers the stages of a correction: dictionary lookups, language model
//! scoring and full text correction, single and batched.

use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use speliuk::analysis::UnicodeWordTokenizer;
use speliuk::corrector::Speliuk;
use speliuk::detection::LexiconDetector;
use speliuk::lm::NgramModel;
use speliuk::spelling::{SpellingDictionary, SymSpell, Verbosity};
use std::hint::black_box;

const WORDS: [(&str, u64); 24] = [
    ("я", 1000),
    ("ти", 800),
    ("він", 900),
    ("вона", 850),
    ("живу", 500),
    ("живе", 400),
    ("живуть", 300),
    ("в", 5000),
    ("у", 4000),
    ("києві", 100),
    ("львові", 90),
    ("місто", 200),
    ("місті", 180),
    ("великому", 150),
    ("гарному", 120),
    ("працюю", 110),
    ("працює", 130),
    ("школі", 140),
    ("університеті", 70),
    ("сьогодні", 260),
    ("завтра", 240),
    ("дуже", 600),
    ("добре", 550),
    ("погода", 160),
];

fn build_symspell() -> SymSpell {
    let mut dictionary = SpellingDictionary::new();
    for (word, count) in WORDS {
        dictionary.add_word(word, count);
    }
    SymSpell::from_dictionary(&dictionary, 2, 7, 1).unwrap()
}

/// A bigram model over the benchmark vocabulary.
fn build_model() -> NgramModel {
    let mut model = NgramModel::new(2).unwrap();
    model.insert(&["<s>"], -99.0, -0.5).unwrap();
    model.insert(&["</s>"], -1.0, 0.0).unwrap();
    model.insert(&["<unk>"], -5.0, 0.0).unwrap();

    let total: u64 = WORDS.iter().map(|(_, c)| c).sum();
    for (word, count) in WORDS {
        let logprob = (count as f64 / total as f64).log10() as f32;
        model.insert(&[word], logprob, -0.3).unwrap();
    }
    for pair in WORDS.windows(2) {
        model.insert(&[pair[0].0, pair[1].0], -0.5, 0.0).unwrap();
    }
    model
}

fn build_corrector() -> Speliuk {
    let symspell = Arc::new(build_symspell());
    Speliuk::new(
        Box::new(UnicodeWordTokenizer::new()),
        Box::new(LexiconDetector::new(Arc::clone(&symspell))),
        symspell,
        Arc::new(build_model()),
    )
}

/// Generate sentences with a misspelling every few words.
fn generate_sentences(count: usize) -> Vec<String> {
    let misspelled = ["живк", "кеєві", "пацюю", "сьогодн", "дуже", "погода", "вона", "мсто"];
    (0..count)
        .map(|i| {
            (0..8)
                .map(|j| misspelled[(i * 3 + j * 5) % misspelled.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Benchmark symmetric delete lookups.
fn bench_symspell(c: &mut Criterion) {
    let mut group = c.benchmark_group("symspell");

    group.bench_function("build_index", |b| {
        b.iter(|| black_box(build_symspell()))
    });

    let symspell = build_symspell();
    let misspellings = ["живк", "кеєві", "унверситеті", "сьогодн", "пррацюю"];

    group.throughput(Throughput::Elements(misspellings.len() as u64));
    for verbosity in [Verbosity::Top, Verbosity::Closest, Verbosity::All] {
        group.bench_function(format!("lookup_{verbosity:?}").to_lowercase(), |b| {
            b.iter(|| {
                for word in &misspellings {
                    let _ = black_box(symspell.lookup(black_box(word), verbosity, 2, true));
                }
            })
        });
    }

    group.finish();
}

/// Benchmark language model scoring.
fn bench_language_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("language_model");
    let model = build_model();

    group.bench_function("score_sentence", |b| {
        b.iter(|| black_box(model.score(black_box("я живу в києві дуже добре"), true, true)))
    });

    group.bench_function("perplexity", |b| {
        b.iter(|| black_box(model.perplexity(black_box("вона працює в школі"))))
    });

    group.finish();
}

/// Benchmark full corrections.
fn bench_correction(c: &mut Criterion) {
    let mut group = c.benchmark_group("correction");
    group.sample_size(20);

    let speliuk = build_corrector();
    let sentences = generate_sentences(200);

    group.bench_function("correct_sentence", |b| {
        b.iter(|| black_box(speliuk.correct(black_box("Я живк в Кеєві дуже добре."))))
    });

    group.throughput(Throughput::Elements(sentences.len() as u64));
    group.bench_function("correct_sequential", |b| {
        b.iter(|| {
            for sentence in &sentences {
                let _ = black_box(speliuk.correct(sentence));
            }
        })
    });

    group.bench_function("correct_batch_parallel", |b| {
        b.iter(|| black_box(speliuk.correct_batch(&sentences)))
    });

    group.finish();
}

criterion_group!(benches, bench_symspell, bench_language_model, bench_correction);
criterion_main!(benches);
