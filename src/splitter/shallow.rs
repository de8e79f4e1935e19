//! Baseline splitter: one singleton node per shared element.

use std::collections::{HashMap, HashSet};

use crate::types::{Collection, Dag, Node, NodeId};

/// Extract every element found in two or more inputs into its own node.
///
/// ## Algorithm
///
/// 1. Count, per element, how many inputs contain it
/// 2. Shared elements (count ≥ 2) get a singleton node, numbered in
///    first-appearance order (inputs in order, each in its own order)
/// 3. Each root keeps its unshared elements as `rest` and imports the
///    singletons of its shared elements, in collection order
///
/// A sequence holding a shared element k times imports its singleton k
/// times, so the multiset reconstructs. Co-occurring elements are never
/// grouped. Linear in the total element count.
pub fn split_shallow<C: Collection>(inputs: &[C]) -> Dag<C> {
    let mut counts: HashMap<&C::Item, usize> = HashMap::new();
    for input in inputs {
        let distinct: HashSet<&C::Item> = input.items().collect();
        for item in distinct {
            *counts.entry(item).or_insert(0) += 1;
        }
    }

    // Singletons are created after all roots.
    let mut singletons: HashMap<&C::Item, NodeId> = HashMap::new();
    let mut shared: Vec<&C::Item> = Vec::new();
    for input in inputs {
        for item in input.items() {
            if counts[item] >= 2 && !singletons.contains_key(item) {
                singletons.insert(item, NodeId::new(inputs.len() + shared.len()));
                shared.push(item);
            }
        }
    }

    let mut dag = Dag::new();
    for input in inputs {
        let rest = C::from_items(input.items().filter(|item| counts[*item] == 1).cloned());
        let imports = input
            .items()
            .filter_map(|item| singletons.get(item).copied())
            .collect();
        dag.push_root(Node::from_parts(input.clone(), rest, imports, 0));
    }
    for item in shared {
        dag.push(Node::generated(C::from_items(std::iter::once(item.clone()))));
    }
    dag.assign_depths();

    tracing::debug!(
        inputs = inputs.len(),
        generated = dag.generated_count(),
        "shallow split complete"
    );
    dag
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sets(families: &[&[u32]]) -> Vec<BTreeSet<u32>> {
        families.iter().map(|f| f.iter().copied().collect()).collect()
    }

    #[test]
    fn test_three_overlapping_sets() {
        let dag = split_shallow(&sets(&[&[1, 2, 3], &[2, 3, 4], &[3, 4, 5]]));

        assert_eq!(dag.root_count(), 3);
        assert_eq!(dag.generated_count(), 3);

        let rests: Vec<Vec<u32>> = dag
            .roots()
            .map(|(_, n)| n.rest().iter().copied().collect())
            .collect();
        assert_eq!(rests, vec![vec![1], vec![], vec![5]]);

        // Singletons for 2, 3, 4 in first-appearance order.
        let singles: Vec<Vec<u32>> = dag
            .generated()
            .map(|(_, n)| n.collection().iter().copied().collect())
            .collect();
        assert_eq!(singles, vec![vec![2], vec![3], vec![4]]);

        let (n2, n3, n4) = (NodeId::new(3), NodeId::new(4), NodeId::new(5));
        assert_eq!(dag.nodes()[0].imports(), &[n2, n3]);
        assert_eq!(dag.nodes()[1].imports(), &[n2, n3, n4]);
        assert_eq!(dag.nodes()[2].imports(), &[n3, n4]);
        assert!(dag.generated().all(|(_, n)| n.depth() == 1));
        assert!(dag.roots().all(|(_, n)| n.depth() == 0));
    }

    #[test]
    fn test_sequence_duplicates_import_twice() {
        let dag = split_shallow(&[vec!['a', 'b', 'a', 'c'], vec!['a', 'd']]);

        let first = &dag.nodes()[0];
        assert_eq!(first.rest(), &vec!['b', 'c']);
        assert_eq!(first.imports(), &[NodeId::new(2), NodeId::new(2)]);

        let mut rebuilt = dag.reconstruct(NodeId::new(0)).unwrap();
        rebuilt.sort();
        assert_eq!(rebuilt, vec!['a', 'a', 'b', 'c']);
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty: Vec<Vec<u8>> = Vec::new();
        assert!(split_shallow(&empty).is_empty());

        let dag = split_shallow(&[Vec::<u8>::new(), Vec::new()]);
        assert_eq!(dag.len(), 2);
        assert_eq!(dag.generated_count(), 0);
    }

    #[test]
    fn test_idempotent() {
        let inputs = sets(&[&[1, 2], &[2, 3], &[1, 3, 4]]);
        assert_eq!(split_shallow(&inputs), split_shallow(&inputs));
    }
}
