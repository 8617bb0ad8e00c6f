use crate::models::Sentiment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Precision/recall/F1 for a single class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Evaluation over a labeled set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Fraction of correct predictions
    pub accuracy: f64,

    /// Macro-averaged precision
    pub precision: f64,

    /// Macro-averaged recall
    pub recall: f64,

    /// Macro-averaged F1
    pub f1_score: f64,

    /// Per-class metrics keyed by label name
    pub per_class: HashMap<String, ClassMetrics>,

    /// Rows are true labels, columns predicted, both in class-index order
    pub confusion_matrix: Vec<Vec<usize>>,

    /// Number of evaluated samples
    pub n_samples: usize,
}

impl EvaluationReport {
    pub fn empty() -> Self {
        Self {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            per_class: HashMap::new(),
            confusion_matrix: vec![vec![0; Sentiment::COUNT]; Sentiment::COUNT],
            n_samples: 0,
        }
    }

    /// Flat metric map for run tracking
    pub fn as_metric_map(&self) -> HashMap<String, f64> {
        let mut map = HashMap::from([
            ("accuracy".to_string(), self.accuracy),
            ("precision_macro".to_string(), self.precision),
            ("recall_macro".to_string(), self.recall),
            ("f1_macro".to_string(), self.f1_score),
        ]);

        for (label, class) in &self.per_class {
            map.insert(format!("f1_{label}"), class.f1_score);
        }

        map
    }
}

/// Compute accuracy, per-class precision/recall/F1 and the confusion matrix
///
/// `y_true` and `y_pred` must be aligned; classes absent from `y_true` simply
/// report zero support instead of poisoning the averages with NaN.
pub fn evaluate(y_true: &[Sentiment], y_pred: &[Sentiment]) -> EvaluationReport {
    let n_samples = y_true.len().min(y_pred.len());
    if n_samples == 0 {
        return EvaluationReport::empty();
    }

    let mut confusion = vec![vec![0usize; Sentiment::COUNT]; Sentiment::COUNT];
    for (truth, pred) in y_true.iter().zip(y_pred.iter()) {
        confusion[truth.class_index()][pred.class_index()] += 1;
    }

    let correct: usize = (0..Sentiment::COUNT).map(|i| confusion[i][i]).sum();
    let accuracy = correct as f64 / n_samples as f64;

    let mut per_class = HashMap::new();
    for label in Sentiment::ALL {
        let idx = label.class_index();

        let tp = confusion[idx][idx];
        let fp: usize = (0..Sentiment::COUNT)
            .filter(|&row| row != idx)
            .map(|row| confusion[row][idx])
            .sum();
        let fn_count: usize = (0..Sentiment::COUNT)
            .filter(|&col| col != idx)
            .map(|col| confusion[idx][col])
            .sum();

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };

        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let support = confusion[idx].iter().sum();

        per_class.insert(
            label.to_string(),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1,
                support,
            },
        );
    }

    let n_classes = Sentiment::COUNT as f64;
    let avg_precision: f64 = per_class.values().map(|m| m.precision).sum::<f64>() / n_classes;
    let avg_recall: f64 = per_class.values().map(|m| m.recall).sum::<f64>() / n_classes;
    let avg_f1: f64 = per_class.values().map(|m| m.f1_score).sum::<f64>() / n_classes;

    EvaluationReport {
        accuracy,
        precision: avg_precision,
        recall: avg_recall,
        f1_score: avg_f1,
        per_class,
        confusion_matrix: confusion,
        n_samples,
    }
}
