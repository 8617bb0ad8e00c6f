use crate::error::{AppError, Result};
use crate::ml::dataset::TrainingDataset;
use crate::ml::metrics::{evaluate, EvaluationReport};
use crate::models::Sentiment;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};
use smartcore::naive_bayes::gaussian::GaussianNB;
use strum::{Display, EnumString};

type SmartcoreLr = LogisticRegression<f64, i32, DenseMatrix<f64>, Vec<i32>>;
type SmartcoreNb = GaussianNB<f64, usize, DenseMatrix<f64>, Vec<usize>>;

/// Which classifier family a model artifact holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    NaiveBayes,
}

/// Trait for sentiment classifiers
pub trait Classifier: Send + Sync {
    /// Fit on a dataset and report metrics over the training split itself
    fn fit(&mut self, dataset: &TrainingDataset) -> Result<EvaluationReport>;

    /// Predict labels for a feature matrix
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Sentiment>>;

    /// Predict per-class scores, one row per sample, each row summing to 1.0
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Get model kind
    fn kind(&self) -> ModelKind;

    /// Check if model is fitted
    fn is_fitted(&self) -> bool;
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

fn not_fitted() -> AppError {
    AppError::Internal("model must be fitted before predict".to_string())
}

/// Multinomial logistic regression
///
/// Fitting goes through smartcore; afterwards only the weight matrix and
/// intercept are kept, so the struct serializes as plain arrays and inference
/// is an explicit softmax over `x·Wᵀ + b`. Evaluation and serving therefore
/// share one inference path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    /// L2 regularization strength passed to the solver
    l2_penalty: f64,

    /// Weight matrix, one row per class in class-index order
    weights: Option<Array2<f64>>,

    /// Per-class intercept
    intercept: Option<Array1<f64>>,
}

impl LogisticRegressionClassifier {
    pub fn new(l2_penalty: f64) -> Self {
        Self {
            l2_penalty,
            weights: None,
            intercept: None,
        }
    }

    /// Copy coefficients out of a fitted smartcore model into row-per-class
    /// ndarray form, accepting either orientation smartcore may use.
    fn extract_weights(model: &SmartcoreLr, n_features: usize) -> Result<(Array2<f64>, Array1<f64>)> {
        use smartcore::linalg::basic::arrays::Array;

        let n_classes = Sentiment::COUNT;
        let coef = model.coefficients();
        let (rows, cols) = coef.shape();

        let mut weights = Array2::zeros((n_classes, n_features));
        if rows == n_classes && cols == n_features {
            for i in 0..n_classes {
                for j in 0..n_features {
                    weights[[i, j]] = *coef.get((i, j));
                }
            }
        } else if rows == n_features && cols == n_classes {
            for i in 0..n_classes {
                for j in 0..n_features {
                    weights[[i, j]] = *coef.get((j, i));
                }
            }
        } else {
            return Err(AppError::Training(format!(
                "unexpected coefficient shape ({rows}, {cols}) for {n_classes} classes and {n_features} features"
            )));
        }

        let raw_intercept = model.intercept();
        let (ir, ic) = raw_intercept.shape();
        if ir * ic != n_classes {
            return Err(AppError::Training(format!(
                "unexpected intercept shape ({ir}, {ic}) for {n_classes} classes"
            )));
        }

        let mut intercept = Array1::zeros(n_classes);
        let mut k = 0;
        for i in 0..ir {
            for j in 0..ic {
                intercept[k] = *raw_intercept.get((i, j));
                k += 1;
            }
        }

        Ok((weights, intercept))
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, dataset: &TrainingDataset) -> Result<EvaluationReport> {
        let x = ndarray_to_densematrix(&dataset.features);
        let y: Vec<i32> = dataset
            .labels
            .iter()
            .map(|label| label.class_index() as i32)
            .collect();

        let params = LogisticRegressionParameters::default().with_alpha(self.l2_penalty);
        let model = LogisticRegression::fit(&x, &y, params).map_err(|e| {
            AppError::Training(format!("failed to fit logistic regression: {e}"))
        })?;

        let (weights, intercept) = Self::extract_weights(&model, dataset.n_features)?;
        self.weights = Some(weights);
        self.intercept = Some(intercept);

        let predictions = self.predict(&dataset.features)?;
        Ok(evaluate(&dataset.labels, &predictions))
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Sentiment>> {
        let proba = self.predict_proba(features)?;
        let mut labels = Vec::with_capacity(proba.nrows());

        for row in proba.rows() {
            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (idx, score) in row.iter().enumerate() {
                if *score > best_score {
                    best = idx;
                    best_score = *score;
                }
            }
            let label = Sentiment::from_class_index(best)
                .ok_or_else(|| AppError::Internal("class index out of range".to_string()))?;
            labels.push(label);
        }

        Ok(labels)
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let weights = self.weights.as_ref().ok_or_else(not_fitted)?;
        let intercept = self.intercept.as_ref().ok_or_else(not_fitted)?;

        if features.ncols() != weights.ncols() {
            return Err(AppError::Internal(format!(
                "feature dimension mismatch: input has {}, model expects {}",
                features.ncols(),
                weights.ncols()
            )));
        }

        let mut scores = features.dot(&weights.t()) + intercept;

        // Row-wise softmax, shifted by the row max for numeric stability
        for mut row in scores.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |m, v| m.max(*v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            }
        }

        Ok(scores)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LogisticRegression
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

/// Gaussian naive Bayes
///
/// The fitted smartcore model is serialized whole; scores come back as the
/// one-hot encoding of the predicted class.
#[derive(Debug, Serialize, Deserialize)]
pub struct GaussianNbClassifier {
    model: Option<SmartcoreNb>,
}

// smartcore's GaussianNB does not implement Clone; deep-copy a fitted model
// through the same bincode encoding the artifact layer persists it with.
impl Clone for GaussianNbClassifier {
    fn clone(&self) -> Self {
        let model = self.model.as_ref().map(|m| {
            let bytes = bincode::serialize(m).expect("fitted GaussianNB serializes");
            bincode::deserialize(&bytes).expect("serialized GaussianNB deserializes")
        });
        Self { model }
    }
}

impl GaussianNbClassifier {
    pub fn new() -> Self {
        Self { model: None }
    }
}

impl Default for GaussianNbClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for GaussianNbClassifier {
    fn fit(&mut self, dataset: &TrainingDataset) -> Result<EvaluationReport> {
        let x = ndarray_to_densematrix(&dataset.features);
        let y: Vec<usize> = dataset
            .labels
            .iter()
            .map(|label| label.class_index())
            .collect();

        let model = GaussianNB::fit(&x, &y, Default::default())
            .map_err(|e| AppError::Training(format!("failed to fit naive Bayes: {e}")))?;
        self.model = Some(model);

        let predictions = self.predict(&dataset.features)?;
        Ok(evaluate(&dataset.labels, &predictions))
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Sentiment>> {
        let model = self.model.as_ref().ok_or_else(not_fitted)?;

        let x = ndarray_to_densematrix(features);
        let predictions = model
            .predict(&x)
            .map_err(|e| AppError::Internal(format!("prediction failed: {e}")))?;

        predictions
            .into_iter()
            .map(|idx| {
                Sentiment::from_class_index(idx)
                    .ok_or_else(|| AppError::Internal("class index out of range".to_string()))
            })
            .collect()
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let predictions = self.predict(features)?;
        let mut proba = Array2::zeros((predictions.len(), Sentiment::COUNT));

        for (i, label) in predictions.iter().enumerate() {
            proba[[i, label.class_index()]] = 1.0;
        }

        Ok(proba)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::NaiveBayes
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }
}

/// A fitted model in serializable form
///
/// This is what the model artifact stores; everything that consumes a model
/// goes through the [`Classifier`] impl so the two families stay
/// interchangeable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelState {
    LogisticRegression(LogisticRegressionClassifier),
    NaiveBayes(GaussianNbClassifier),
}

impl ModelState {
    /// Create an unfitted model of the requested kind
    pub fn new(kind: ModelKind, l2_penalty: f64) -> Self {
        match kind {
            ModelKind::LogisticRegression => {
                ModelState::LogisticRegression(LogisticRegressionClassifier::new(l2_penalty))
            }
            ModelKind::NaiveBayes => ModelState::NaiveBayes(GaussianNbClassifier::new()),
        }
    }

    pub fn as_classifier(&self) -> &dyn Classifier {
        match self {
            ModelState::LogisticRegression(inner) => inner,
            ModelState::NaiveBayes(inner) => inner,
        }
    }

    fn as_classifier_mut(&mut self) -> &mut dyn Classifier {
        match self {
            ModelState::LogisticRegression(inner) => inner,
            ModelState::NaiveBayes(inner) => inner,
        }
    }
}

impl Classifier for ModelState {
    fn fit(&mut self, dataset: &TrainingDataset) -> Result<EvaluationReport> {
        self.as_classifier_mut().fit(dataset)
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Sentiment>> {
        self.as_classifier().predict(features)
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        self.as_classifier().predict_proba(features)
    }

    fn kind(&self) -> ModelKind {
        self.as_classifier().kind()
    }

    fn is_fitted(&self) -> bool {
        self.as_classifier().is_fitted()
    }
}
