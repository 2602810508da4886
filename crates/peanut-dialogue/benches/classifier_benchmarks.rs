//! Benchmarks for per-turn classification cost.
//!
//! Classification runs on every utterance before any response is rendered,
//! so it should stay well under a millisecond even for the worst case where
//! every rule in the table is tried and nothing matches.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use peanut_dialogue::response::{ResponseGenerator, SlotValues};
use peanut_dialogue::{IntentClassifier, ResponseCategory};

/// Utterances spread across the rule table, including late and missing matches.
fn sample_utterances() -> Vec<String> {
    [
        "hello",
        "how are you doing today",
        "my name is thabo",
        "tell me a joke",
        "thanks a lot",
        "what time is it",
        "what's the weather in new york",
        "sure",
        "hmm interesting",
        "what is the capital of lesotho",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// A long utterance that matches no rule.
fn long_unmatched_utterance() -> String {
    "please summarize the quarterly report and list every open action item ".repeat(25)
}

fn bench_classify(c: &mut Criterion) {
    let classifier = IntentClassifier::new();
    let utterances = sample_utterances();
    let long = long_unmatched_utterance();

    let mut group = c.benchmark_group("classification");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("mixed_utterances", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let text = &utterances[idx % utterances.len()];
            idx += 1;
            classifier.classify(text)
        });
    });

    group.bench_function("long_unmatched", |b| b.iter(|| classifier.classify(&long)));

    group.bench_function("fallback_location", |b| {
        b.iter(|| classifier.extract_fallback_location("random gibberish city"))
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut generator = ResponseGenerator::new(Some(1));
    let values = SlotValues::new().name("Thabo").time("3:07 PM");

    let mut group = c.benchmark_group("rendering");
    group.bench_function("small_talk", |b| {
        b.iter(|| generator.render(ResponseCategory::SmallTalk, &values))
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_render);
criterion_main!(benches);
