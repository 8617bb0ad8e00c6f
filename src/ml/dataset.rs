use crate::error::{AppError, Result};
use crate::ml::vectorizer::TfidfVectorizer;
use crate::models::{LabeledExample, Sentiment};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A vectorized dataset ready for fitting or evaluation
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature matrix, one row per example
    pub features: Array2<f64>,

    /// Labels aligned with feature rows
    pub labels: Vec<Sentiment>,

    /// Number of samples
    pub n_samples: usize,

    /// Number of features
    pub n_features: usize,
}

impl TrainingDataset {
    pub fn from_parts(features: Array2<f64>, labels: Vec<Sentiment>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(AppError::Internal(format!(
                "feature rows ({}) and labels ({}) are misaligned",
                features.nrows(),
                labels.len()
            )));
        }

        let n_samples = features.nrows();
        let n_features = features.ncols();

        Ok(Self {
            features,
            labels,
            n_samples,
            n_features,
        })
    }

    /// Vectorize labeled examples with an already-fitted vectorizer
    pub fn from_examples(examples: &[LabeledExample], vectorizer: &TfidfVectorizer) -> Result<Self> {
        let documents: Vec<Vec<String>> = examples
            .iter()
            .map(|example| example.processed.tokens.clone())
            .collect();

        let features = vectorizer.transform_batch(&documents)?;
        let labels = examples.iter().map(|example| example.label).collect();

        Self::from_parts(features, labels)
    }

    /// Per-class sample counts in class-index order
    pub fn class_counts(&self) -> [usize; Sentiment::COUNT] {
        count_labels(self.labels.iter().copied())
    }
}

fn count_labels(labels: impl Iterator<Item = Sentiment>) -> [usize; Sentiment::COUNT] {
    let mut counts = [0usize; Sentiment::COUNT];
    for label in labels {
        counts[label.class_index()] += 1;
    }
    counts
}

/// Per-class counts for a slice of labeled examples
pub fn class_counts(examples: &[LabeledExample]) -> [usize; Sentiment::COUNT] {
    count_labels(examples.iter().map(|example| example.label))
}

/// Fail unless every sentiment class has at least `min_per_class` examples
///
/// A corpus missing a class entirely would silently cripple the classifier,
/// so the pipeline refuses it up front.
pub fn validate_class_coverage(examples: &[LabeledExample], min_per_class: usize) -> Result<()> {
    let counts = class_counts(examples);
    let floor = min_per_class.max(1);

    for label in Sentiment::ALL {
        let count = counts[label.class_index()];
        if count < floor {
            return Err(AppError::DataQuality(format!(
                "label '{label}' has {count} examples, need at least {floor}"
            )));
        }
    }

    Ok(())
}

/// Seeded shuffle-and-split into (train, test)
///
/// The same seed over the same examples always produces the same partition.
pub fn train_test_split(
    examples: &[LabeledExample],
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<LabeledExample>, Vec<LabeledExample>)> {
    if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
        return Err(AppError::Validation(format!(
            "test_split must be in (0, 1), got {test_ratio}"
        )));
    }
    if examples.len() < 2 {
        return Err(AppError::DataQuality(format!(
            "need at least 2 examples to split, got {}",
            examples.len()
        )));
    }

    let mut shuffled = examples.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n = shuffled.len();
    let n_test = ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1);
    let test = shuffled.split_off(n - n_test);

    Ok((shuffled, test))
}
