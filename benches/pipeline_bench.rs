use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use stylometer::analysis::FeatureExtractor;
use stylometer::config::AnalysisConfig;
use stylometer::corpus::{Corpus, Document};
use stylometer::ml::{NearestCentroid, Sample};
use stylometer::pipeline::Pipeline;

const WORDS: [&str; 16] = [
    "tempus", "animus", "virtus", "fortuna", "natura", "ratio", "amicus", "vita", "mors",
    "patria", "lex", "bellum", "pax", "gloria", "fides", "sapientia",
];

/// Synthetic corpus where each author favours a different slice of the word list.
fn generate_corpus(authors: usize, texts_per_author: usize, words_per_text: usize) -> Corpus {
    let mut documents = Vec::with_capacity(authors * texts_per_author);
    for a in 0..authors {
        for t in 0..texts_per_author {
            let text: Vec<&str> = (0..words_per_text)
                .map(|w| WORDS[(a * 5 + (w * 7 + t) % 6) % WORDS.len()])
                .collect();
            documents.push(Document::new(
                format!("Author{a}_{t}"),
                format!("Author{a}"),
                text.join(" "),
            ));
        }
    }
    Corpus::from_documents(documents)
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_extraction");
    let extractor = FeatureExtractor::new(2, 4, 50).unwrap();

    for texts_per_author in [5, 20] {
        let corpus = generate_corpus(4, texts_per_author, 200);
        let texts = corpus.texts();
        group.bench_with_input(
            BenchmarkId::from_parameter(corpus.len()),
            &texts,
            |b, texts| b.iter(|| extractor.extract(black_box(texts)).unwrap()),
        );
    }
    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let corpus = generate_corpus(4, 20, 200);
    let features = FeatureExtractor::new(2, 4, 50)
        .unwrap()
        .extract(&corpus.texts())
        .unwrap();
    let samples = Sample::from_corpus(&corpus, &features.matrix).unwrap();

    c.bench_function("nearest_centroid_fit_predict", |b| {
        b.iter(|| {
            let model = NearestCentroid::fit(black_box(&samples)).unwrap();
            black_box(model.predict_all(&samples))
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let corpus = generate_corpus(4, 10, 200);
    let pipeline = Pipeline::new(AnalysisConfig::default())
        .unwrap()
        .without_projections();

    c.bench_function("pipeline_without_projections", |b| {
        b.iter(|| pipeline.run(black_box(&corpus), None).unwrap())
    });
}

criterion_group!(benches, bench_features, bench_classification, bench_pipeline);
criterion_main!(benches);
