//! Read-only statistics over a finished extraction DAG.
//!
//! Every walk also checks reconstruction: the elements reachable from a node
//! through `rest` and imports must equal its collection. A mismatch means a
//! splitter bug and is reported, never repaired.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::types::{Collection, Dag, DagError, NodeId};

/// Errors from the metrics pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    /// Requested node is not in the list.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Reachable elements differ from the node's collection.
    #[error("Node {node} reconstructs to {found} elements, expected {expected}")]
    ReconstructionMismatch {
        /// Node whose reconstruction failed.
        node: NodeId,
        /// Elements in its collection.
        expected: usize,
        /// Elements reachable through rest and imports.
        found: usize,
    },

    /// The list is structurally broken.
    #[error("Malformed node list: {0}")]
    Dag(#[from] DagError),
}

/// Statistics of the import tree below one node.
///
/// Shared children are counted once per path that reaches them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeMetrics {
    /// Deepest depth reached.
    pub max_depth: usize,
    /// Reached nodes without imports (the start node included).
    pub leaves: usize,
    /// Import edges followed.
    pub imports: usize,
    /// Nodes reached, the start node included.
    pub nodes: usize,
    /// Sum of leaf depths.
    pub leaf_depth_sum: usize,
}

/// Aggregate over every root (depth 0 node) of a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Deepest depth reached from any root.
    pub max_depth: usize,
    /// Mean per-root max depth.
    pub avg_max_depth: f64,
    /// Mean leaf depth.
    pub avg_depth: f64,
    /// Mean leaves per root.
    pub avg_leaves: f64,
    /// Mean import edges per root.
    pub avg_imports: f64,
    /// Mean reached nodes per root.
    pub avg_nodes: f64,
    /// Nodes with depth > 0.
    pub generated_nodes: usize,
    /// Nodes with depth 0.
    pub roots: usize,
    /// Elements across all root collections, counting repeats.
    pub elements_count: usize,
    /// Distinct elements across all root collections.
    pub unique_elements: usize,
}

/// Metrics pass over a node list.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagMetrics;

impl DagMetrics {
    /// Summarize a whole list.
    ///
    /// Fails on a structurally invalid list or on the first root that does
    /// not reconstruct.
    pub fn compute<C: Collection>(dag: &Dag<C>) -> Result<MetricsSummary, MetricsError> {
        dag.validate()?;

        let mut summary = MetricsSummary::default();
        let mut totals = NodeMetrics::default();
        let mut max_depth_sum = 0usize;
        let mut unique: HashSet<&C::Item> = HashSet::new();

        for (id, node) in dag.iter() {
            if node.depth() > 0 {
                summary.generated_nodes += 1;
                continue;
            }
            let m = walk(dag, id)?;
            summary.roots += 1;
            summary.max_depth = summary.max_depth.max(m.max_depth);
            summary.elements_count += node.collection().len();
            unique.extend(node.collection().items());

            max_depth_sum += m.max_depth;
            totals.leaves += m.leaves;
            totals.imports += m.imports;
            totals.nodes += m.nodes;
            totals.leaf_depth_sum += m.leaf_depth_sum;
        }
        summary.unique_elements = unique.len();

        if summary.roots > 0 {
            let roots = summary.roots as f64;
            summary.avg_max_depth = max_depth_sum as f64 / roots;
            summary.avg_leaves = totals.leaves as f64 / roots;
            summary.avg_imports = totals.imports as f64 / roots;
            summary.avg_nodes = totals.nodes as f64 / roots;
        }
        if totals.leaves > 0 {
            summary.avg_depth = totals.leaf_depth_sum as f64 / totals.leaves as f64;
        }

        tracing::debug!(
            roots = summary.roots,
            generated = summary.generated_nodes,
            max_depth = summary.max_depth,
            "metrics computed"
        );
        Ok(summary)
    }

    /// Metrics of the import tree below one node.
    pub fn node_metrics<C: Collection>(
        dag: &Dag<C>,
        id: NodeId,
    ) -> Result<NodeMetrics, MetricsError> {
        if dag.get(id).is_none() {
            return Err(MetricsError::UnknownNode(id));
        }
        dag.validate()?;
        walk(dag, id)
    }
}

/// Path-expanded metrics from `start`; the list must already be validated.
///
/// Each reachable node is visited once and weighted by the number of import
/// paths from `start` to it. Depths strictly increase along imports, so
/// visiting in depth order sees every parent before its children.
fn walk<C: Collection>(dag: &Dag<C>, start: NodeId) -> Result<NodeMetrics, MetricsError> {
    let root = dag.get(start).ok_or(MetricsError::UnknownNode(start))?;

    let mut reached: Vec<NodeId> = vec![start];
    let mut seen: HashSet<NodeId> = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let node = dag.get(id).ok_or(MetricsError::UnknownNode(id))?;
        for &child in node.imports() {
            if seen.insert(child) {
                reached.push(child);
                stack.push(child);
            }
        }
    }
    reached.sort_by_key(|&id| (dag.node(id).depth(), id));

    let mut paths: HashMap<NodeId, usize> = HashMap::from([(start, 1)]);
    let mut metrics = NodeMetrics::default();
    let mut found: HashMap<&C::Item, usize> = HashMap::new();
    for id in reached {
        let node = dag.node(id);
        let count = paths.get(&id).copied().unwrap_or(0);
        metrics.nodes = metrics.nodes.saturating_add(count);
        metrics.max_depth = metrics.max_depth.max(node.depth());
        metrics.imports = metrics
            .imports
            .saturating_add(count.saturating_mul(node.imports().len()));
        if node.is_leaf() {
            metrics.leaves = metrics.leaves.saturating_add(count);
            metrics.leaf_depth_sum = metrics
                .leaf_depth_sum
                .saturating_add(count.saturating_mul(node.depth()));
        }
        for item in node.rest().items() {
            let entry = found.entry(item).or_insert(0);
            *entry = entry.saturating_add(count);
        }
        for &child in node.imports() {
            let entry = paths.entry(child).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    if found != root.collection().counts() {
        let expected = root.collection().len();
        let found = found.values().fold(0usize, |sum, &n| sum.saturating_add(n));
        tracing::error!(
            node = %start,
            expected,
            found,
            "RECONSTRUCTION_MISMATCH: reachable elements differ from collection"
        );
        return Err(MetricsError::ReconstructionMismatch {
            node: start,
            expected,
            found,
        });
    }
    Ok(metrics)
}
