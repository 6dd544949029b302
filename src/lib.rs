pub mod classifier;
pub mod domain;
pub mod models;
pub mod processing;
pub mod repository;

/// Upper bound on candidates offered to the classifier in a single call.
pub const MAX_CANDIDATES: usize = 100;

/// Records enriched concurrently unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 20;
