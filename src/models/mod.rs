pub mod comment;
pub mod prediction;
pub mod sentiment;

pub use comment::*;
pub use prediction::*;
pub use sentiment::*;
