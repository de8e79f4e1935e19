//! Set ↔ sequence adapters.
//!
//! The greedy splitter works on sequences and the weighted splitter on sets;
//! each exposes the other shape through these conversions. Nodes correspond
//! positionally (root `i` ↔ input `i`, generated node `k` ↔ generated node
//! `k`), so imports and depths carry over unchanged.

use std::collections::BTreeSet;
use std::hash::Hash;

use crate::types::{Collection, Dag};

/// Sets as sequences, elements in set order.
pub fn to_sequences<T: Clone>(sets: &[BTreeSet<T>]) -> Vec<Vec<T>> {
    sets.iter().map(|set| set.iter().cloned().collect()).collect()
}

/// Sequences as sets of their distinct elements.
pub fn to_sets<T: Ord + Clone>(sequences: &[Vec<T>]) -> Vec<BTreeSet<T>> {
    sequences.iter().map(|seq| seq.iter().cloned().collect()).collect()
}

/// Translate a sequence-shaped result back to sets.
///
/// Lossless when the sequences came from [`to_sequences`] (no duplicates).
pub fn sequence_dag_to_sets<T: Ord + Clone + Hash>(dag: Dag<Vec<T>>) -> Dag<BTreeSet<T>> {
    dag.map_collections(|_, collection, rest| {
        (
            BTreeSet::from_items(collection),
            BTreeSet::from_items(rest),
        )
    })
}

/// Translate a set-shaped result back to the original sequences.
///
/// Roots get their original sequence back. A root's rest is the original
/// minus one occurrence of every delegated element, so duplicates beyond the
/// first occurrence stay in the root's rest and reconstruction still yields
/// the original multiset. Generated nodes become sequences in set order.
pub fn set_dag_to_sequences<T: Ord + Clone + Hash>(
    dag: Dag<BTreeSet<T>>,
    originals: &[Vec<T>],
) -> Dag<Vec<T>> {
    debug_assert_eq!(dag.root_count(), originals.len());
    let root_count = dag.root_count();
    dag.map_collections(|id, collection, rest| match originals.get(id.index()) {
        Some(original) if id.index() < root_count => {
            let delegated: Vec<T> = collection.difference(&rest).cloned().collect();
            let mut seq_rest = original.clone();
            seq_rest.remove_all(&delegated);
            (original.clone(), seq_rest)
        }
        _ => (Vec::from_items(collection), Vec::from_items(rest)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Node, NodeId};

    #[test]
    fn test_shape_conversions() {
        let sets = to_sets(&[vec![3, 1, 3], vec![]]);
        assert_eq!(sets[0].iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!(sets[1].is_empty());
        assert_eq!(to_sequences(&sets), vec![vec![1, 3], vec![]]);
    }

    #[test]
    fn test_set_result_keeps_duplicates_in_root_rest() {
        let originals = vec![vec![1, 1, 2], vec![2, 1]];
        let mut dag: Dag<BTreeSet<u32>> = Dag::new();
        let shared: BTreeSet<u32> = [1, 2].into_iter().collect();
        for set in to_sets(&originals) {
            let mut root = Node::root(set);
            root.delegate(NodeId::new(2), &shared);
            dag.push_root(root);
        }
        dag.push(Node::generated(shared));
        dag.assign_depths();

        let seq = set_dag_to_sequences(dag, &originals);
        let root = seq.get(NodeId::new(0)).unwrap();
        assert_eq!(root.collection(), &vec![1, 1, 2]);
        assert_eq!(root.rest(), &vec![1]);
        assert_eq!(root.imports(), &[NodeId::new(2)]);
        assert_eq!(seq.get(NodeId::new(1)).unwrap().rest(), &Vec::<u32>::new());
        assert_eq!(seq.get(NodeId::new(2)).unwrap().collection(), &vec![1, 2]);
        assert_eq!(seq.get(NodeId::new(2)).unwrap().depth(), 1);

        let mut rebuilt = seq.reconstruct(NodeId::new(0)).unwrap();
        rebuilt.sort();
        assert_eq!(rebuilt, vec![1, 1, 2]);
    }
}
