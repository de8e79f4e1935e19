//! ExtractionPolicy v1: named weight presets for the weighted splitter.
//!
//! Closures cannot be hashed or serialized, so the policy names the built-in
//! weight functions instead. A policy hash identifies the ordering a run used;
//! two runs with the same inputs and the same `params_hash` produce the same
//! node list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::scoring::{self, WeightFn};
use crate::canonical::canonical_hash_hex;
use crate::DEFAULT_POLICY_VERSION;

/// Built-in weight function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPreset {
    /// `elements × sets`.
    Coverage,
    /// `elements × sets − elements − sets`.
    Savings,
    /// `elements`.
    Elements,
    /// `sets`.
    Sets,
}

impl WeightPreset {
    /// The weight function this preset names.
    pub fn weight_fn(self) -> WeightFn {
        let weight: fn(usize, usize) -> f64 = match self {
            Self::Coverage => scoring::coverage,
            Self::Savings => scoring::savings,
            Self::Elements => scoring::element_count,
            Self::Sets => scoring::set_count,
        };
        Arc::new(weight)
    }
}

impl fmt::Display for WeightPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coverage => write!(f, "coverage"),
            Self::Savings => write!(f, "savings"),
            Self::Elements => write!(f, "elements"),
            Self::Sets => write!(f, "sets"),
        }
    }
}

/// Extraction policy version 1.
///
/// ## Parameters
///
/// - `primary`: ranks intersections; the highest is extracted next
/// - `secondary`: breaks primary ties, evaluated on live participant counts
///
/// Remaining ties go to the smallest intersection key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPolicy {
    /// Policy version identifier.
    pub version: String,
    /// Primary weight.
    pub primary: WeightPreset,
    /// Tie-break weight.
    pub secondary: WeightPreset,
}

impl ExtractionPolicy {
    /// Create a policy from two presets.
    pub fn new(primary: WeightPreset, secondary: WeightPreset) -> Self {
        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            primary,
            secondary,
        }
    }

    /// Get the policy ID.
    pub fn policy_id(&self) -> &str {
        &self.version
    }

    /// Hash of the policy parameters.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self::new(WeightPreset::Coverage, WeightPreset::Elements)
    }
}
