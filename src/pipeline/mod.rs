// Data processing pipeline: normalization, filtering and chart aggregation

pub mod processing;

// Re-export key types and functions from each stage
pub use processing::{aggregate, filter, license, normalize};
