//! Weighted splitter: extract the best-scoring pairwise intersection,
//! patch the overlap index, repeat.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::overlap::{pair, OverlapIndex, Pair};
use crate::adapter::{set_dag_to_sequences, to_sets};
use crate::policy::{ExtractionPolicy, WeightFn};
use crate::types::collection::intersect_sets;
use crate::types::{Dag, Node, NodeId};

/// Encodes an element group as an index key.
pub type JoinFn<T, K> = Arc<dyn Fn(&BTreeSet<T>) -> K + Send + Sync>;

/// Decodes an index key back into its element group.
pub type SplitFn<T, K> = Arc<dyn Fn(&K) -> BTreeSet<T> + Send + Sync>;

/// Incremental weighted splitter over sets.
///
/// Keeps every pairwise intersection of live rests in an overlap index keyed
/// by `join(intersection)` and ranked by `primary(elements, sets)`. Each step
/// extracts the top-ranked intersection and repairs only the index entries
/// the extraction invalidated.
///
/// ## Selection
///
/// 1. Highest primary weight
/// 2. Highest secondary weight, evaluated on the live participant count
/// 3. Smallest key
///
/// ## Invalidation
///
/// For the chosen elements `E` with direct participants `D`:
///
/// - updated sets are `D` plus every set reachable through an overlapping
///   key whose rest still holds all of `E`
/// - an overlapping key loses exactly the pairs that touch an updated set;
///   those pairs are re-intersected after the rests shrink
/// - the new node is intersected with every other live rest
///
/// Pairs between two sets outside the updated group keep their entries.
///
/// ## Preconditions
///
/// `join` and `split` must be inverse bijections on element groups.
/// Colliding keys are not detected and degrade the result.
#[derive(Clone)]
pub struct WeightedSplitter<T, K> {
    join: JoinFn<T, K>,
    split: SplitFn<T, K>,
    primary: WeightFn,
    secondary: WeightFn,
}

impl<T, K> fmt::Debug for WeightedSplitter<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedSplitter").finish_non_exhaustive()
    }
}

impl<T: Ord + Clone + Hash> WeightedSplitter<T, Vec<T>> {
    /// Splitter keyed by the sorted element list, with the default policy.
    pub fn canonical() -> Self {
        Self::from_policy(
            |set: &BTreeSet<T>| set.iter().cloned().collect(),
            |key: &Vec<T>| key.iter().cloned().collect(),
            &ExtractionPolicy::default(),
        )
    }
}

impl<T: Ord + Clone + Hash, K: Ord + Clone> WeightedSplitter<T, K> {
    /// Create a splitter from a key bijection and two weight functions.
    pub fn new<J, S>(join: J, split: S, primary: WeightFn, secondary: WeightFn) -> Self
    where
        J: Fn(&BTreeSet<T>) -> K + Send + Sync + 'static,
        S: Fn(&K) -> BTreeSet<T> + Send + Sync + 'static,
    {
        Self {
            join: Arc::new(join),
            split: Arc::new(split),
            primary,
            secondary,
        }
    }

    /// Create a splitter whose weights come from a policy.
    pub fn from_policy<J, S>(join: J, split: S, policy: &ExtractionPolicy) -> Self
    where
        J: Fn(&BTreeSet<T>) -> K + Send + Sync + 'static,
        S: Fn(&K) -> BTreeSet<T> + Send + Sync + 'static,
    {
        tracing::debug!(
            policy = policy.policy_id(),
            primary = %policy.primary,
            secondary = %policy.secondary,
            "weighted splitter from policy"
        );
        Self::new(
            join,
            split,
            policy.primary.weight_fn(),
            policy.secondary.weight_fn(),
        )
    }

    /// Split sequences through the sequence → set adapter.
    ///
    /// Roots keep their original sequences; duplicate occurrences beyond
    /// the first stay in the root's rest.
    pub fn split_sequences(&self, sequences: &[Vec<T>]) -> Dag<Vec<T>> {
        set_dag_to_sequences(self.split_sets(&to_sets(sequences)), sequences)
    }

    /// Split sets.
    pub fn split_sets(&self, sets: &[BTreeSet<T>]) -> Dag<BTreeSet<T>> {
        let mut dag = Dag::from_roots(sets);
        let mut index = OverlapIndex::new(self.primary.clone(), self.secondary.clone());

        for i in 0..sets.len() {
            for j in i + 1..sets.len() {
                self.record(&mut index, &sets[i], &sets[j], (NodeId::new(i), NodeId::new(j)));
            }
        }
        tracing::debug!(inputs = sets.len(), intersections = index.len(), "overlap index built");

        let mut extractions = 0usize;
        while let Some(key) = index.select_max() {
            let child = self.extract(&mut dag, &mut index, key);
            extractions += 1;
            tracing::trace!(
                node = %child,
                size = dag.node(child).collection().len(),
                depth = dag.node(child).depth(),
                live = index.len(),
                "extracted intersection"
            );
        }
        debug_assert!(index.is_empty());

        tracing::debug!(
            inputs = sets.len(),
            extractions,
            max_depth = dag.max_depth(),
            "weighted split complete"
        );
        dag
    }

    /// One extraction step; returns the new node.
    fn extract(
        &self,
        dag: &mut Dag<BTreeSet<T>>,
        index: &mut OverlapIndex<K>,
        key: K,
    ) -> NodeId {
        let elements = (self.split)(&key);
        let direct = index.participants(&key);

        // Grow the updated group through keys overlapping the extraction.
        let mut updated: BTreeSet<NodeId> = direct.iter().copied().collect();
        let mut stale: BTreeSet<K> = BTreeSet::new();
        let mut worklist = direct;
        while let Some(set) = worklist.pop() {
            for other in index.keys_of(set) {
                if other == key || stale.contains(&other) {
                    continue;
                }
                if (self.split)(&other).is_disjoint(&elements) {
                    continue;
                }
                for touched in index.participants(&other) {
                    if !updated.contains(&touched)
                        && dag.node(touched).rest().is_superset(&elements)
                    {
                        updated.insert(touched);
                        worklist.push(touched);
                    }
                }
                stale.insert(other);
            }
        }

        index.remove_key(&key);
        let mut retest: BTreeSet<Pair> = BTreeSet::new();
        for other in &stale {
            let touching: Vec<Pair> = index
                .pairs(other)
                .iter()
                .copied()
                .filter(|(a, b)| updated.contains(a) || updated.contains(b))
                .collect();
            for p in touching {
                index.remove_pair(other, p);
                retest.insert(p);
            }
        }

        let depth = updated
            .iter()
            .map(|&id| dag.node(id).depth() + 1)
            .max()
            .unwrap_or(1);
        let mut node = Node::generated(elements.clone());
        node.set_depth(depth);
        let child = dag.push(node);
        for &id in &updated {
            debug_assert!(dag.node(id).rest().is_superset(&elements));
            dag.node_mut(id).delegate(child, &elements);
        }

        for (id, node) in dag.iter() {
            if id != child && !node.rest().is_empty() {
                self.record(index, &elements, node.rest(), pair(id, child));
            }
        }
        for (a, b) in retest {
            self.record(index, dag.node(a).rest(), dag.node(b).rest(), (a, b));
        }
        child
    }

    fn record(&self, index: &mut OverlapIndex<K>, a: &BTreeSet<T>, b: &BTreeSet<T>, pair: Pair) {
        let shared = intersect_sets(a, b);
        if !shared.is_empty() {
            index.insert((self.join)(&shared), shared.len(), pair);
        }
    }
}
