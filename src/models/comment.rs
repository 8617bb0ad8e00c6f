use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Sentiment;
use crate::preprocessing;

/// A raw YouTube comment as ingested.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Comment {
    /// Unique identifier
    pub id: Uuid,

    /// Raw comment text, unmodified
    #[validate(length(max = 10000))]
    pub text: String,

    /// Comment author, when the source provides one
    pub author: Option<String>,

    /// Video the comment was posted under
    pub video_id: Option<String>,

    /// Ingestion timestamp
    pub fetched_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment with a fresh identifier.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            author: None,
            video_id: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }
}

/// A comment after text normalization and tokenization.
///
/// Every comment maps to exactly one `ProcessedComment`; a comment whose text
/// normalizes to nothing keeps an empty token list rather than disappearing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedComment {
    /// Identifier of the source comment
    pub comment_id: Uuid,

    /// Normalized tokens in original order
    pub tokens: Vec<String>,
}

impl ProcessedComment {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            comment_id: comment.id,
            tokens: preprocessing::tokenize(&comment.text),
        }
    }

    /// Build directly from text, minting a comment id.
    pub fn from_text(text: &str) -> Self {
        Self {
            comment_id: Uuid::new_v4(),
            tokens: preprocessing::tokenize(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A processed comment paired with its ground-truth label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledExample {
    pub processed: ProcessedComment,
    pub label: Sentiment,
}

impl LabeledExample {
    pub fn new(processed: ProcessedComment, label: Sentiment) -> Self {
        Self { processed, label }
    }

    /// Convenience constructor used by loaders and tests.
    pub fn from_text(text: &str, label: Sentiment) -> Self {
        Self {
            processed: ProcessedComment::from_text(text),
            label,
        }
    }
}
