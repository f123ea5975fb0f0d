//! Storage layer: Parquet sample dataset, memoized per path, with random row sampling.

mod error;
pub use error::StoreError;

pub mod dataset;
pub use dataset::{Dataset, DatasetCache, DatasetSampler, Sample};
