use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentiment label attached to a comment.
///
/// The variant order is the canonical class order everywhere a label turns
/// into a class index: negative = 0, neutral = 1, positive = 2.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// All labels in class-index order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Number of sentiment classes.
    pub const COUNT: usize = 3;

    /// Class index used for model targets and score vectors.
    pub fn class_index(&self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    /// Inverse of [`Sentiment::class_index`].
    pub fn from_class_index(index: usize) -> Option<Sentiment> {
        Sentiment::ALL.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_class_index_round_trip() {
        for label in Sentiment::ALL {
            assert_eq!(Sentiment::from_class_index(label.class_index()), Some(label));
        }
        assert_eq!(Sentiment::from_class_index(3), None);
    }

    #[test]
    fn test_string_round_trip() {
        assert_eq!(Sentiment::from_str("positive").unwrap(), Sentiment::Positive);
        assert_eq!(Sentiment::Negative.to_string(), "negative");
        assert!(Sentiment::from_str("meh").is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Sentiment::Neutral).unwrap();
        assert_eq!(json, "\"neutral\"");
        let back: Sentiment = serde_json::from_str("\"positive\"").unwrap();
        assert_eq!(back, Sentiment::Positive);
    }
}
