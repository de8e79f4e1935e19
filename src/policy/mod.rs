//! Extraction policy definitions.

pub mod v1;
pub mod scoring;

pub use v1::{ExtractionPolicy, WeightPreset};
pub use scoring::{quantize_weight, WeightFn};
