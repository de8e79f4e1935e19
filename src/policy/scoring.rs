//! Weight functions and candidate ordering for weighted extraction.

use std::cmp::Ordering;
use std::sync::Arc;

/// Scores an intersection from `(intersecting_element_count, intersecting_set_count)`.
///
/// Higher weight = extracted earlier.
pub type WeightFn = Arc<dyn Fn(usize, usize) -> f64 + Send + Sync>;

/// Quantization factor for float weights.
/// Weights are multiplied by this value and rounded to i64.
const WEIGHT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Quantize a weight so bucket keys and comparisons are exact.
///
/// NaN maps to 0; infinities saturate.
pub fn quantize_weight(weight: f64) -> i64 {
    (weight * WEIGHT_QUANTIZATION_FACTOR).round() as i64
}

/// Element occurrences covered: `elements × sets`.
pub fn coverage(elements: usize, sets: usize) -> f64 {
    (elements * sets) as f64
}

/// Storage saved by extracting: covered occurrences minus the new node's
/// own elements minus one import edge per set.
///
/// ```text
/// savings = elements * sets - elements - sets
/// ```
pub fn savings(elements: usize, sets: usize) -> f64 {
    (elements * sets) as f64 - elements as f64 - sets as f64
}

/// Number of shared elements.
pub fn element_count(elements: usize, _sets: usize) -> f64 {
    elements as f64
}

/// Number of sets sharing the elements.
pub fn set_count(_elements: usize, sets: usize) -> f64 {
    sets as f64
}

/// An intersection competing for extraction.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<'a, K> {
    pub key: &'a K,
    pub primary: i64,
    pub secondary: i64,
}

impl<K: Ord> PartialEq for Candidate<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Candidate<'_, K> {}

impl<K: Ord> PartialOrd for Candidate<'_, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for Candidate<'_, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Primary: higher primary weight first
        // Secondary: higher secondary weight first
        // Tertiary: smaller key first, so the maximum is deterministic
        self.primary
            .cmp(&other.primary)
            .then(self.secondary.cmp(&other.secondary))
            .then_with(|| other.key.cmp(self.key))
    }
}
