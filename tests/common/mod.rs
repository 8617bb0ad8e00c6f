//! Shared helpers for integration tests: a small labeled comment corpus
//! with clearly separated vocabularies per class, and a trainer wired for
//! fast deterministic runs.

use comment_sentiment::config::{LogisticConfig, TrainingConfig};
use comment_sentiment::ml::{ModelKind, VectorizerConfig};
use comment_sentiment::training::{load_labeled_csv, Trainer, TrainingOutcome};
use std::fs;
use std::path::{Path, PathBuf};

pub fn sample_csv() -> String {
    let mut csv = String::from("text,label\n");

    let positive = [
        "\"This video is amazing, I love it!\"",
        "\"Great video, loved every second\"",
        "\"Awesome content, best channel ever\"",
        "I love this amazing tutorial",
        "\"Great work, really awesome editing\"",
    ];
    let negative = [
        "\"This video is terrible, I hate it\"",
        "\"Awful content, worst channel ever\"",
        "I hate this terrible tutorial",
        "\"Bad work, really awful editing\"",
        "Horrible video hated every second",
    ];
    let neutral = [
        "The video was uploaded on monday",
        "This tutorial covers rust basics",
        "The channel posts weekly videos",
        "Second part of the series",
        "Video length is ten minutes",
    ];

    for i in 0..10 {
        csv.push_str(&format!("{},positive\n", positive[i % positive.len()]));
        csv.push_str(&format!("{},negative\n", negative[i % negative.len()]));
        csv.push_str(&format!("{},neutral\n", neutral[i % neutral.len()]));
    }

    csv
}

pub fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("comments.csv");
    fs::write(&path, sample_csv()).unwrap();
    path
}

pub fn training_config(runs_dir: &Path) -> TrainingConfig {
    TrainingConfig {
        seed: 7,
        test_split: 0.2,
        min_examples_per_class: 2,
        model: ModelKind::LogisticRegression,
        runs_dir: runs_dir.to_path_buf(),
        vectorizer: VectorizerConfig {
            max_vocab_size: 500,
            min_doc_freq: 1,
            ngram_max: 1,
        },
        logistic: LogisticConfig { l2_penalty: 0.1 },
    }
}

pub fn train_from_csv(csv: &Path, artifacts: &Path, runs: &Path) -> TrainingOutcome {
    let examples = load_labeled_csv(csv).unwrap();
    let trainer = Trainer::new(training_config(runs));
    trainer.run(&examples, artifacts).unwrap()
}
