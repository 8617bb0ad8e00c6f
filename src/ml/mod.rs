/// Machine learning module for comment sentiment classification
///
/// This module provides the trainable pieces of the pipeline:
/// - TF-IDF feature extraction over preprocessed tokens
/// - Multinomial logistic regression and naive Bayes classifiers
/// - Dataset assembly and seeded train/test splitting
/// - Evaluation metrics (accuracy, per-class precision/recall/F1,
///   confusion matrix)
pub mod classifier;
pub mod dataset;
pub mod metrics;
pub mod vectorizer;

pub use classifier::{
    Classifier, GaussianNbClassifier, LogisticRegressionClassifier, ModelKind, ModelState,
};
pub use dataset::{train_test_split, validate_class_coverage, TrainingDataset};
pub use metrics::{evaluate, ClassMetrics, EvaluationReport};
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
