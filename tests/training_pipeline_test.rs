//! End-to-end tests for the training pipeline: labeled CSV in, versioned
//! artifact pair out, predictions served from the reloaded artifacts.

mod common;

use comment_sentiment::artifact::{load_bundle, MANIFEST_FILE, MODEL_FILE, VECTORIZER_FILE};
use comment_sentiment::models::Sentiment;
use comment_sentiment::serving::SentimentEngine;
use comment_sentiment::tracking::{list_runs, RunStatus};
use comment_sentiment::training::{evaluate_bundle, load_labeled_csv};
use std::fs;

#[test]
fn test_train_from_csv_and_serve_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    let runs = tempfile::tempdir().unwrap();

    let csv = common::write_sample_csv(dir.path());
    let outcome = common::train_from_csv(&csv, artifacts.path(), runs.path());

    assert!(artifacts.path().join(VECTORIZER_FILE).is_file());
    assert!(artifacts.path().join(MODEL_FILE).is_file());
    assert!(artifacts.path().join(MANIFEST_FILE).is_file());
    assert_eq!(outcome.run.status, RunStatus::Completed);

    let engine = SentimentEngine::load(artifacts.path()).unwrap();
    assert_eq!(engine.artifact_version(), outcome.manifest.artifact_version);

    let result = engine.predict("This video is amazing!").unwrap();
    assert_eq!(result.label, Sentiment::Positive);
    assert!(!result.fallback);

    let result = engine.predict("This video is terrible, I hate it!").unwrap();
    assert_eq!(result.label, Sentiment::Negative);
}

#[test]
fn test_same_seed_produces_identical_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let csv = common::write_sample_csv(dir.path());

    let artifacts_a = tempfile::tempdir().unwrap();
    let runs_a = tempfile::tempdir().unwrap();
    let outcome_a = common::train_from_csv(&csv, artifacts_a.path(), runs_a.path());

    let artifacts_b = tempfile::tempdir().unwrap();
    let runs_b = tempfile::tempdir().unwrap();
    let outcome_b = common::train_from_csv(&csv, artifacts_b.path(), runs_b.path());

    // Distinct runs mint distinct artifact versions
    assert_ne!(
        outcome_a.manifest.artifact_version,
        outcome_b.manifest.artifact_version
    );

    // but the same seed yields the same split and the same model
    assert_eq!(outcome_a.n_train, outcome_b.n_train);
    assert_eq!(outcome_a.n_test, outcome_b.n_test);
    assert_eq!(outcome_a.manifest.vocab_size, outcome_b.manifest.vocab_size);

    let engine_a = SentimentEngine::load(artifacts_a.path()).unwrap();
    let engine_b = SentimentEngine::load(artifacts_b.path()).unwrap();

    let probes = [
        "This video is amazing!",
        "Horrible video, hated every second",
        "The channel posts weekly videos",
        "I love this tutorial",
    ];
    for probe in &probes {
        let a = engine_a.predict(probe).unwrap();
        let b = engine_b.predict(probe).unwrap();
        assert_eq!(a.label, b.label, "labels diverged for {:?}", probe);
        for (name, score) in &a.scores {
            assert!(
                (score - b.scores[name]).abs() < 1e-9,
                "scores diverged for {:?}",
                probe
            );
        }
    }
}

#[test]
fn test_artifacts_from_different_runs_refuse_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let csv = common::write_sample_csv(dir.path());

    let artifacts_a = tempfile::tempdir().unwrap();
    let runs_a = tempfile::tempdir().unwrap();
    common::train_from_csv(&csv, artifacts_a.path(), runs_a.path());

    let artifacts_b = tempfile::tempdir().unwrap();
    let runs_b = tempfile::tempdir().unwrap();
    common::train_from_csv(&csv, artifacts_b.path(), runs_b.path());

    // Graft run B's model next to run A's vectorizer and manifest
    fs::copy(
        artifacts_b.path().join(MODEL_FILE),
        artifacts_a.path().join(MODEL_FILE),
    )
    .unwrap();

    let err = SentimentEngine::load(artifacts_a.path()).unwrap_err();
    assert!(
        err.to_string().contains("mismatch"),
        "unexpected error: {}",
        err
    );
}

#[test]
fn test_evaluate_bundle_against_holdout() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    let runs = tempfile::tempdir().unwrap();

    let csv = common::write_sample_csv(dir.path());
    common::train_from_csv(&csv, artifacts.path(), runs.path());

    let bundle = load_bundle(artifacts.path()).unwrap();
    let holdout = load_labeled_csv(&csv).unwrap();
    let report = evaluate_bundle(&bundle, &holdout).unwrap();

    assert_eq!(report.n_samples, holdout.len());
    assert!(report.accuracy > 0.7);
    assert_eq!(report.per_class.len(), 3);
}

#[test]
fn test_runs_are_recorded_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let runs = tempfile::tempdir().unwrap();
    let csv = common::write_sample_csv(dir.path());

    let artifacts_a = tempfile::tempdir().unwrap();
    common::train_from_csv(&csv, artifacts_a.path(), runs.path());
    let artifacts_b = tempfile::tempdir().unwrap();
    common::train_from_csv(&csv, artifacts_b.path(), runs.path());

    let recorded = list_runs(runs.path()).unwrap();
    assert_eq!(recorded.len(), 2);
    assert!(recorded[0].started_at >= recorded[1].started_at);
    assert!(recorded.iter().all(|r| r.status == RunStatus::Completed));
}
