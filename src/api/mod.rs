pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::serving::SentimentEngine;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SentimentEngine>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<SentimentEngine>) -> Self {
        Self {
            engine,
            started_at: Instant::now(),
        }
    }
}
