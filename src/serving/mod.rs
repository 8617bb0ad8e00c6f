//! Online prediction engine.
//!
//! [`SentimentEngine`] wraps a verified artifact pair loaded once at startup.
//! It is immutable after construction, so the HTTP layer shares it behind an
//! `Arc` without any locking. Retraining produces a new artifact directory
//! and a process restart picks it up.

use crate::artifact::{self, ArtifactBundle, ArtifactManifest};
use crate::error::Result;
use crate::ml::{Classifier, ModelKind, ModelState, TfidfVectorizer};
use crate::models::PredictionResult;
use crate::preprocessing;
use ndarray::Array2;
use tracing::info;

#[derive(Debug)]
pub struct SentimentEngine {
    vectorizer: TfidfVectorizer,
    model: ModelState,
    manifest: ArtifactManifest,
}

impl SentimentEngine {
    /// Load and verify the artifact pair from `dir`
    ///
    /// Any load failure is fatal to the caller; there is no degraded mode
    /// where the service answers without a verified pair.
    pub fn load(dir: &std::path::Path) -> Result<Self> {
        let bundle = artifact::load_bundle(dir)?;

        info!(
            artifact_version = %bundle.manifest.artifact_version,
            model = %bundle.manifest.model,
            vocab_size = bundle.manifest.vocab_size,
            "Loaded artifact pair"
        );

        Ok(Self::from_bundle(bundle))
    }

    /// Build an engine from an in-memory bundle, bypassing disk
    pub fn from_bundle(bundle: ArtifactBundle) -> Self {
        Self {
            vectorizer: bundle.vectorizer,
            model: bundle.model,
            manifest: bundle.manifest,
        }
    }

    /// Classify one comment
    ///
    /// Never fails for ordinary text. A comment that yields no usable
    /// features (empty, whitespace, or entirely out-of-vocabulary) gets the
    /// neutral fallback instead of a model score.
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let tokens = preprocessing::tokenize(text);
        if tokens.is_empty() {
            return Ok(PredictionResult::neutral_fallback());
        }

        let features = self.vectorizer.transform(&tokens)?;
        if features.iter().all(|v| *v == 0.0) {
            return Ok(PredictionResult::neutral_fallback());
        }

        let matrix = features.insert_axis(ndarray::Axis(0));
        self.classify_row(&matrix)
    }

    /// Classify a batch, preserving input order
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<PredictionResult>> {
        texts.iter().map(|text| self.predict(text)).collect()
    }

    fn classify_row(&self, matrix: &Array2<f64>) -> Result<PredictionResult> {
        let labels = self.model.predict(matrix)?;
        let proba = self.model.predict_proba(matrix)?;

        let label = labels[0];
        let scores: Vec<f64> = proba.row(0).iter().copied().collect();

        Ok(PredictionResult::from_scores(label, &scores))
    }

    pub fn artifact_version(&self) -> &str {
        &self.manifest.artifact_version
    }

    pub fn model_kind(&self) -> ModelKind {
        self.manifest.model
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactChecksums, ARTIFACT_SCHEMA_VERSION};
    use crate::ml::{EvaluationReport, TrainingDataset, VectorizerConfig};
    use crate::models::Sentiment;
    use chrono::Utc;
    use std::collections::HashMap;

    fn fitted_bundle() -> ArtifactBundle {
        let texts = [
            "this video is amazing i love it",
            "great video loved every second",
            "awesome content best channel ever",
            "this video is terrible i hate it",
            "awful content worst channel ever",
            "bad work really awful editing",
            "the video was uploaded on monday",
            "this tutorial covers rust basics",
            "the channel posts weekly videos",
        ];
        let labels = vec![
            Sentiment::Positive,
            Sentiment::Positive,
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Negative,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Neutral,
            Sentiment::Neutral,
        ];

        let documents: Vec<Vec<String>> = texts.iter().map(|t| preprocessing::tokenize(t)).collect();
        let mut vectorizer = TfidfVectorizer::new(VectorizerConfig {
            max_vocab_size: 500,
            min_doc_freq: 1,
            ngram_max: 1,
        });
        let features = vectorizer.fit_transform(&documents).unwrap();
        let dataset = TrainingDataset::from_parts(features, labels).unwrap();

        let mut model = ModelState::new(crate::ml::ModelKind::LogisticRegression, 0.1);
        model.fit(&dataset).unwrap();

        let manifest = ArtifactManifest {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            artifact_version: "engine-test".to_string(),
            created_at: Utc::now(),
            model: crate::ml::ModelKind::LogisticRegression,
            labels: Sentiment::ALL.iter().map(|l| l.to_string()).collect(),
            seed: 42,
            n_features: vectorizer.n_features(),
            vocab_size: vectorizer.vocab_size(),
            hyperparameters: HashMap::new(),
            evaluation: EvaluationReport::empty(),
            checksums: ArtifactChecksums::default(),
        };

        ArtifactBundle {
            manifest,
            vectorizer,
            model,
        }
    }

    fn test_engine() -> SentimentEngine {
        SentimentEngine::from_bundle(fitted_bundle())
    }

    #[test]
    fn test_positive_comment_is_positive() {
        let engine = test_engine();
        let result = engine.predict("This video is amazing!").unwrap();

        assert_eq!(result.label, Sentiment::Positive);
        assert!(!result.fallback);
        assert!(result.confidence() > 1.0 / 3.0);
    }

    #[test]
    fn test_negative_comment_is_negative() {
        let engine = test_engine();
        let result = engine.predict("terrible content, i hate it").unwrap();
        assert_eq!(result.label, Sentiment::Negative);
    }

    #[test]
    fn test_empty_comment_gets_neutral_fallback() {
        let engine = test_engine();

        for text in ["", "   ", "\t\n", "!!!", "👍"] {
            let result = engine.predict(text).unwrap();
            assert_eq!(result.label, Sentiment::Neutral, "input: {text:?}");
            assert!(result.fallback, "input: {text:?}");
        }
    }

    #[test]
    fn test_out_of_vocabulary_comment_gets_neutral_fallback() {
        let engine = test_engine();
        let result = engine.predict("zzzqqq xyzzy frobnicate").unwrap();

        assert_eq!(result.label, Sentiment::Neutral);
        assert!(result.fallback);
    }

    #[test]
    fn test_batch_preserves_order_and_length() {
        let engine = test_engine();
        let texts = vec![
            "i love this".to_string(),
            "".to_string(),
            "i hate this".to_string(),
        ];

        let results = engine.predict_batch(&texts).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, Sentiment::Positive);
        assert!(results[1].fallback);
        assert_eq!(results[2].label, Sentiment::Negative);
    }

    #[test]
    fn test_scores_cover_all_labels_and_sum_to_one() {
        let engine = test_engine();
        let result = engine.predict("great tutorial").unwrap();

        assert_eq!(result.scores.len(), Sentiment::COUNT);
        let total: f64 = result.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let engine = test_engine();
        let a = engine.predict("love the editing but the sound is awful").unwrap();
        let b = engine.predict("love the editing but the sound is awful").unwrap();

        assert_eq!(a.label, b.label);
        assert_eq!(a.scores, b.scores);
    }

    #[test]
    fn test_loaded_engine_matches_in_memory_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = fitted_bundle();
        crate::artifact::save_bundle(
            dir.path(),
            &bundle.vectorizer,
            &bundle.model,
            bundle.manifest.clone(),
        )
        .unwrap();

        let in_memory = SentimentEngine::from_bundle(bundle);
        let loaded = SentimentEngine::load(dir.path()).unwrap();

        for text in [
            "this video is amazing i love it",
            "awful content worst channel ever",
            "the video was uploaded on monday",
            "words the vocabulary has never seen",
            "",
        ] {
            let a = in_memory.predict(text).unwrap();
            let b = loaded.predict(text).unwrap();

            assert_eq!(a.label, b.label, "label diverged for {text:?}");
            assert_eq!(a.fallback, b.fallback);
            assert_eq!(a.scores, b.scores, "scores diverged for {text:?}");
        }
    }
}
