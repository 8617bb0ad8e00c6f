use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Sentiment;

/// Outcome of classifying a single comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Identifier echoed from the request, when the caller supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,

    /// Predicted sentiment label
    pub label: Sentiment,

    /// Per-class scores keyed by label name; sums to 1.0
    pub scores: HashMap<String, f64>,

    /// True when the comment produced no usable features and the engine
    /// answered with the neutral fallback
    pub fallback: bool,
}

impl PredictionResult {
    /// Build a result from a score vector in class-index order.
    pub fn from_scores(label: Sentiment, scores: &[f64]) -> Self {
        let scores = Sentiment::ALL
            .iter()
            .zip(scores.iter())
            .map(|(l, s)| (l.to_string(), *s))
            .collect();

        Self {
            comment_id: None,
            label,
            scores,
            fallback: false,
        }
    }

    /// The low-confidence answer for comments with no usable features:
    /// neutral, with a uniform score over all classes.
    pub fn neutral_fallback() -> Self {
        let uniform = 1.0 / Sentiment::COUNT as f64;
        let scores = Sentiment::ALL
            .iter()
            .map(|l| (l.to_string(), uniform))
            .collect();

        Self {
            comment_id: None,
            label: Sentiment::Neutral,
            scores,
            fallback: true,
        }
    }

    pub fn with_comment_id(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = Some(comment_id.into());
        self
    }

    /// Score of the predicted label.
    pub fn confidence(&self) -> f64 {
        self.scores
            .get(&self.label.to_string())
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scores_keys_by_label_name() {
        let result = PredictionResult::from_scores(Sentiment::Positive, &[0.1, 0.2, 0.7]);

        assert_eq!(result.label, Sentiment::Positive);
        assert_eq!(result.scores["negative"], 0.1);
        assert_eq!(result.scores["neutral"], 0.2);
        assert_eq!(result.scores["positive"], 0.7);
        assert!(!result.fallback);
        assert!((result.confidence() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_fallback_is_uniform() {
        let result = PredictionResult::neutral_fallback();

        assert_eq!(result.label, Sentiment::Neutral);
        assert!(result.fallback);
        let total: f64 = result.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
        for score in result.scores.values() {
            assert!((score - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_comment_id_echo() {
        let result = PredictionResult::neutral_fallback().with_comment_id("abc-123");
        assert_eq!(result.comment_id.as_deref(), Some("abc-123"));
    }
}
