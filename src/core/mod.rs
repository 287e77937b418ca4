// Public modules
pub mod concat;
pub mod dedup;
pub mod error;
pub mod merge;
pub mod refactor;

// Re-export common types for convenience
pub use error::{Error, Result};
