//! Sentiment classification for YouTube comments.
//!
//! The crate is split along the offline/online boundary:
//!
//! - [`preprocessing`]: the single text-normalization implementation shared
//!   by training and serving.
//! - [`ml`]: TF-IDF vectorizer, classifiers, datasets and evaluation.
//! - [`training`]: the batch pipeline that fits a vectorizer/model pair and
//!   persists it as a versioned artifact pair.
//! - [`artifact`]: the on-disk artifact contract (pairing, checksums,
//!   schema version).
//! - [`tracking`]: per-run parameter/metric logging.
//! - [`serving`] + [`api`]: the load-once prediction engine and the HTTP
//!   surface around it.

pub mod api;
pub mod artifact;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod preprocessing;
pub mod serving;
pub mod tracking;
pub mod training;

pub use error::{AppError, Result};
