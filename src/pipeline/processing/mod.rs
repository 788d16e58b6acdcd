// Pipeline processing: license resolution, filtering, normalization and aggregation

pub mod aggregate;
pub mod filter;
pub mod license;
pub mod normalize;
