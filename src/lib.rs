//! # extraction-kernel
//!
//! Deterministic extraction of shared sub-structure from a family of collections.
//!
//! The kernel answers one question:
//!
//! > Given N sets (or sequences), which groups of elements should be stored
//! > **once** and imported by every collection that contains them?
//!
//! ## Core Contract
//!
//! 1. Every input collection becomes a root [`Node`] (depth 0)
//! 2. Shared element groups are carved out into generated nodes
//! 3. Each node keeps the elements it does not delegate in its `rest`
//! 4. Recursively substituting imports reproduces every root exactly
//!
//! ## Architecture
//!
//! ```text
//! inputs → Splitter (shallow | greedy | weighted) → Dag<C> → DagMetrics
//!                        ↓
//!                 OverlapIndex (weighted only)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same inputs + same splitter configuration → identical node list
//! - Roots keep input order; generated nodes keep creation order
//! - All tie-breaks are fixed (see each splitter's docs)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod canonical;
pub mod metrics;
pub mod policy;
pub mod splitter;
pub mod types;

// Re-exports
pub use types::{Collection, Comparator, Comparison, Dag, DagError, Node, NodeId};
pub use types::collection::intersect_sets;
pub use policy::{ExtractionPolicy, WeightFn, WeightPreset};
pub use splitter::{split_shallow, GreedySplitter, WeightedSplitter};
pub use metrics::{DagMetrics, MetricsError, MetricsSummary, NodeMetrics};
pub use adapter::{to_sequences, to_sets};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes, SchemaEnvelope};

/// Schema version for serialized node lists.
/// Increment on breaking changes to `Node` or `Dag`.
pub const EXTRACTION_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default extraction policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "extraction_policy_v1";
