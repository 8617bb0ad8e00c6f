//! Batch training pipeline.
//!
//! [`Trainer::run`] takes labeled examples through the full sequence: class
//! coverage validation, seeded train/test split, vectorizer fit on the train
//! split only, model fit, held-out evaluation, and finally persisting the
//! versioned artifact pair. Every run is recorded under the runs directory
//! whether it succeeds or fails.

pub mod data;

pub use data::load_labeled_csv;

use crate::artifact::{self, ArtifactBundle, ArtifactChecksums, ArtifactManifest, ARTIFACT_SCHEMA_VERSION};
use crate::config::TrainingConfig;
use crate::error::{AppError, Result};
use crate::ml::{
    evaluate, train_test_split, validate_class_coverage, Classifier, EvaluationReport, ModelState,
    TfidfVectorizer, TrainingDataset,
};
use crate::models::{LabeledExample, Sentiment};
use crate::tracking::{RunTracker, TrainingRun};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// What a completed training run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Final tracking record
    pub run: TrainingRun,

    /// Manifest of the saved artifact pair
    pub manifest: ArtifactManifest,

    /// Metrics over the held-out test split
    pub report: EvaluationReport,

    pub n_train: usize,
    pub n_test: usize,
}

/// Orchestrates one training run end to end
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Train on `examples` and write the artifact pair into `artifact_dir`
    ///
    /// The run id minted by the tracker becomes the pair's artifact version.
    pub fn run(&self, examples: &[LabeledExample], artifact_dir: &Path) -> Result<TrainingOutcome> {
        let mut tracker = RunTracker::start(&self.config.runs_dir)?;

        match self.execute(examples, artifact_dir, &mut tracker) {
            Ok((manifest, report, n_train, n_test)) => {
                let run = tracker.finish(&manifest.artifact_version)?;
                info!(
                    run_id = %run.run_id,
                    accuracy = report.accuracy,
                    "Training run completed"
                );
                Ok(TrainingOutcome {
                    run,
                    manifest,
                    report,
                    n_train,
                    n_test,
                })
            }
            Err(e) => {
                if let Err(persist_err) = tracker.fail(&e) {
                    tracing::warn!(error = %persist_err, "Could not persist failed run record");
                }
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        examples: &[LabeledExample],
        artifact_dir: &Path,
        tracker: &mut RunTracker,
    ) -> Result<(ArtifactManifest, EvaluationReport, usize, usize)> {
        validate_class_coverage(examples, self.config.min_examples_per_class)?;

        let artifact_version = tracker.run_id().to_string();
        let hyperparameters = self.hyperparameters();
        for (key, value) in &hyperparameters {
            tracker.log_param(key, value);
        }
        tracker.log_param("n_examples", examples.len());

        let (train, test) = train_test_split(examples, self.config.test_split, self.config.seed)?;
        info!(n_train = train.len(), n_test = test.len(), "Split dataset");

        match validate_class_coverage(&train, 1) {
            Ok(()) => {}
            Err(AppError::DataQuality(msg)) => {
                return Err(AppError::DataQuality(format!(
                    "train split: {msg}; lower test_split or add data"
                )));
            }
            Err(other) => return Err(other),
        }

        // The vectorizer only ever sees the train split
        let train_documents: Vec<Vec<String>> = train
            .iter()
            .map(|example| example.processed.tokens.clone())
            .collect();

        let mut vectorizer = TfidfVectorizer::new(self.config.vectorizer.clone());
        vectorizer.fit(&train_documents)?;
        info!(vocab_size = vectorizer.vocab_size(), "Fitted vectorizer");

        let train_dataset = TrainingDataset::from_examples(&train, &vectorizer)?;
        let test_dataset = TrainingDataset::from_examples(&test, &vectorizer)?;

        let mut model = ModelState::new(self.config.model, self.config.logistic.l2_penalty);
        let train_report = model.fit(&train_dataset)?;
        info!(
            model = %model.kind(),
            train_accuracy = train_report.accuracy,
            "Fitted model"
        );

        let predictions = model.predict(&test_dataset.features)?;
        let report = evaluate(&test_dataset.labels, &predictions);
        info!(
            accuracy = report.accuracy,
            precision = report.precision,
            recall = report.recall,
            f1 = report.f1_score,
            "Evaluated on held-out split"
        );

        for (key, value) in train_report.as_metric_map() {
            tracker.log_metric(format!("train_{key}"), value);
        }
        tracker.log_metrics(&report.as_metric_map());

        let manifest = ArtifactManifest {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            artifact_version,
            created_at: Utc::now(),
            model: model.kind(),
            labels: Sentiment::ALL.iter().map(|l| l.to_string()).collect(),
            seed: self.config.seed,
            n_features: vectorizer.n_features(),
            vocab_size: vectorizer.vocab_size(),
            hyperparameters,
            evaluation: report.clone(),
            checksums: ArtifactChecksums::default(),
        };

        let manifest = artifact::save_bundle(artifact_dir, &vectorizer, &model, manifest)?;

        Ok((manifest, report, train.len(), test.len()))
    }

    fn hyperparameters(&self) -> HashMap<String, String> {
        HashMap::from([
            ("model".to_string(), self.config.model.to_string()),
            ("seed".to_string(), self.config.seed.to_string()),
            ("test_split".to_string(), self.config.test_split.to_string()),
            (
                "min_examples_per_class".to_string(),
                self.config.min_examples_per_class.to_string(),
            ),
            (
                "max_vocab_size".to_string(),
                self.config.vectorizer.max_vocab_size.to_string(),
            ),
            (
                "min_doc_freq".to_string(),
                self.config.vectorizer.min_doc_freq.to_string(),
            ),
            (
                "ngram_max".to_string(),
                self.config.vectorizer.ngram_max.to_string(),
            ),
            (
                "l2_penalty".to_string(),
                self.config.logistic.l2_penalty.to_string(),
            ),
        ])
    }
}

/// Evaluate an already-trained artifact pair against labeled examples
pub fn evaluate_bundle(bundle: &ArtifactBundle, examples: &[LabeledExample]) -> Result<EvaluationReport> {
    if examples.is_empty() {
        return Err(AppError::DataQuality(
            "evaluation set contains no examples".to_string(),
        ));
    }

    let dataset = TrainingDataset::from_examples(examples, &bundle.vectorizer)?;
    let predictions = bundle.model.predict(&dataset.features)?;
    Ok(evaluate(&dataset.labels, &predictions))
}
