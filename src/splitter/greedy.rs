//! Greedy splitter: repeatedly extract the largest shared group.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use crate::adapter::{sequence_dag_to_sets, to_sequences};
use crate::types::{Collection, Comparison, Dag, Node, NodeId};

/// Largest-intersection splitter over sequences.
///
/// ## Algorithm
///
/// Repeat until no element occurs in two live rests:
///
/// 1. Count, per element, its occurrences across all rests
/// 2. Walk the occurrence buckets from highest to lowest; for each element,
///    classify the still-unclassified rests into "contains" / "does not"
///    (rests no longer than the best group so far are dropped)
/// 3. Intersect each "contains" rest with every rest classified before it
///    and keep the first intersection reaching a new maximum length
/// 4. Extract that group: every live rest containing it loses it and
///    imports the new node
///
/// Depths are resolved once the fixpoint is reached.
///
/// ## Enumeration order
///
/// Buckets by occurrence count descending; inside a bucket, elements in first-appearance
/// order scanning nodes in creation order, each rest in its own order. This
/// order fixes which of several equally long groups wins.
#[derive(Debug, Clone)]
pub struct GreedySplitter<T> {
    comparison: Comparison<T>,
}

impl<T> Default for GreedySplitter<T> {
    fn default() -> Self {
        Self {
            comparison: Comparison::Exact,
        }
    }
}

impl<T: Clone + Eq + Hash> GreedySplitter<T> {
    /// Create a splitter with the given intersection mode.
    pub fn new(comparison: Comparison<T>) -> Self {
        Self { comparison }
    }

    /// The intersection mode.
    pub fn comparison(&self) -> &Comparison<T> {
        &self.comparison
    }

    /// Split sets through the set → sequence adapter.
    pub fn split_sets(&self, sets: &[BTreeSet<T>]) -> Dag<BTreeSet<T>>
    where
        T: Ord,
    {
        sequence_dag_to_sets(self.split_sequences(&to_sequences(sets)))
    }

    /// Split sequences.
    pub fn split_sequences(&self, sequences: &[Vec<T>]) -> Dag<Vec<T>> {
        let mut dag = Dag::from_roots(sequences);
        let mut extractions = 0usize;

        while let Some(group) = self.largest_shared_group(&dag) {
            let holders: Vec<NodeId> = dag
                .iter()
                .filter(|(_, node)| node.rest().contains_all(&group))
                .map(|(id, _)| id)
                .collect();
            if holders.len() < 2 {
                // Only reachable with a comparator that disagrees with Eq.
                tracing::warn!(
                    size = group.len(),
                    holders = holders.len(),
                    "shared group not found by equality; stopping extraction"
                );
                break;
            }

            let child = dag.push(Node::generated(group.clone()));
            for &id in &holders {
                dag.node_mut(id).delegate(child, &group);
            }
            extractions += 1;
            tracing::trace!(node = %child, size = group.len(), holders = holders.len(), "extracted group");
        }

        dag.assign_depths();
        tracing::debug!(
            inputs = sequences.len(),
            extractions,
            max_depth = dag.max_depth(),
            "greedy split complete"
        );
        dag
    }

    /// One pass of the search; `None` once nothing is shared.
    fn largest_shared_group(&self, dag: &Dag<Vec<T>>) -> Option<Vec<T>> {
        let rests: Vec<&Vec<T>> = dag.nodes().iter().map(Node::rest).collect();

        // Buckets rank by total occurrences; the stop test counts holders,
        // so a value repeated inside one rest never keeps the loop alive.
        let mut occurrences: HashMap<&T, usize> = HashMap::new();
        let mut holders: HashMap<&T, usize> = HashMap::new();
        let mut first_seen: Vec<&T> = Vec::new();
        for rest in &rests {
            let mut seen: HashSet<&T> = HashSet::new();
            for item in rest.iter() {
                let count = occurrences.entry(item).or_insert(0);
                if *count == 0 {
                    first_seen.push(item);
                }
                *count += 1;
                if seen.insert(item) {
                    *holders.entry(item).or_insert(0) += 1;
                }
            }
        }
        if holders.values().all(|&count| count <= 1) {
            return None;
        }

        let mut buckets: BTreeMap<usize, Vec<&T>> = BTreeMap::new();
        for item in first_seen {
            let count = occurrences[item];
            if count >= 2 {
                buckets.entry(count).or_default().push(item);
            }
        }

        let ordered = self.comparison.is_ordered();
        let prepared: Vec<Vec<T>> = if ordered {
            rests.iter().map(|r| self.comparison.prepare(r)).collect()
        } else {
            Vec::new()
        };
        let operands: Vec<&[T]> = if ordered {
            prepared.iter().map(Vec::as_slice).collect()
        } else {
            rests.iter().map(|r| r.as_slice()).collect()
        };
        let mut unclassified: Vec<usize> = (0..rests.len()).filter(|&i| !rests[i].is_empty()).collect();
        let mut pool: Vec<usize> = Vec::new();
        let mut best: Vec<T> = Vec::new();

        'pass: for items in buckets.values().rev() {
            for item in items {
                if unclassified.is_empty() {
                    break 'pass;
                }
                let floor = best.len();
                let (containing, others): (Vec<usize>, Vec<usize>) = unclassified
                    .iter()
                    .copied()
                    .filter(|&i| rests[i].len() > floor)
                    .partition(|&i| rests[i].contains(item));

                for (pos, &i) in containing.iter().enumerate() {
                    for &j in pool.iter().chain(&containing[..pos]) {
                        if rests[i].len() <= best.len() {
                            break;
                        }
                        if rests[j].len() <= best.len() {
                            continue;
                        }
                        let shared = self.comparison.intersect_prepared(operands[i], operands[j]);
                        if shared.len() > best.len() {
                            best = shared;
                        }
                    }
                }

                pool.extend(containing);
                unclassified = others;
            }
        }

        (!best.is_empty()).then_some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_anywhere<T: Eq + Hash>(dag: &Dag<Vec<T>>) -> bool {
        let mut seen: HashMap<&T, usize> = HashMap::new();
        for (_, node) in dag.iter() {
            let distinct: HashSet<&T> = node.rest().iter().collect();
            for item in distinct {
                *seen.entry(item).or_insert(0) += 1;
            }
        }
        seen.values().any(|&c| c >= 2)
    }

    #[test]
    fn test_extracts_largest_group_first() {
        let splitter = GreedySplitter::new(Comparison::natural());
        let dag = splitter.split_sequences(&[
            vec![1, 2, 3, 4, 9],
            vec![1, 2, 3, 4, 8],
            vec![4, 5, 7],
            vec![5, 6],
        ]);

        let groups: Vec<&Vec<u32>> = dag.generated().map(|(_, n)| n.collection()).collect();
        assert_eq!(groups[0], &vec![1, 2, 3, 4]);
        assert!(!shared_anywhere(&dag));
        assert!(dag.validate().is_ok());
    }

    #[test]
    fn test_nested_extraction_depth() {
        // {2,3,4} is extracted first; then {3} is shared between the new
        // node and the third input.
        let splitter = GreedySplitter::new(Comparison::natural());
        let dag = splitter.split_sequences(&[vec![1, 2, 3, 4], vec![2, 3, 4, 5], vec![3, 6]]);

        assert_eq!(dag.generated_count(), 2);
        assert_eq!(dag.nodes()[3].collection(), &vec![2, 3, 4]);
        assert_eq!(dag.nodes()[4].collection(), &vec![3]);
        assert_eq!(dag.nodes()[3].rest(), &vec![2, 4]);
        assert_eq!(dag.nodes()[4].depth(), 2);
        assert_eq!(dag.nodes()[2].imports(), &[NodeId::new(4)]);
    }

    #[test]
    fn test_modes_agree_on_group_sizes() {
        let inputs = vec![vec![5, 1, 2, 2], vec![2, 5, 2, 7], vec![7, 1]];
        let exact = GreedySplitter::new(Comparison::exact()).split_sequences(&inputs);
        let natural = GreedySplitter::new(Comparison::natural()).split_sequences(&inputs);

        let sizes = |dag: &Dag<Vec<u32>>| -> Vec<usize> {
            dag.generated().map(|(_, n)| n.collection().len()).collect()
        };
        assert_eq!(sizes(&exact), sizes(&natural));
        // Exact mode keeps the order of the later rest.
        assert_eq!(exact.nodes()[3].collection(), &vec![2, 5, 2]);
        assert!(!shared_anywhere(&exact));
    }

    #[test]
    fn test_custom_comparator_keeps_reconstruction() {
        let splitter = GreedySplitter::new(Comparison::by(|a: &String, b: &String| {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }));
        let inputs: Vec<Vec<String>> = vec![
            vec!["ccc".into(), "a".into(), "bb".into()],
            vec!["bb".into(), "ccc".into()],
        ];
        let dag = splitter.split_sequences(&inputs);

        assert_eq!(dag.nodes()[2].collection(), &vec!["bb".to_string(), "ccc".to_string()]);
        assert_eq!(dag.nodes()[0].rest(), &vec!["a".to_string()]);
        assert!(dag.nodes()[1].rest().is_empty());
    }

    #[test]
    fn test_split_sets_roundtrip() {
        let sets: Vec<BTreeSet<u32>> = vec![
            [1, 2, 3].into_iter().collect(),
            [2, 3, 4].into_iter().collect(),
            [3, 4, 5].into_iter().collect(),
        ];
        let dag = GreedySplitter::new(Comparison::natural()).split_sets(&sets);

        for (id, root) in dag.roots() {
            assert_eq!(root.collection(), &sets[id.index()]);
            let rebuilt: BTreeSet<u32> = dag.reconstruct(id).unwrap().into_iter().collect();
            assert_eq!(&rebuilt, root.collection());
        }
    }

    #[test]
    fn test_no_sharing_no_nodes() {
        let dag = GreedySplitter::<u8>::default().split_sequences(&[vec![1, 2], vec![3], vec![]]);
        assert_eq!(dag.generated_count(), 0);
        assert_eq!(dag.nodes()[0].rest(), &vec![1, 2]);

        let dag = GreedySplitter::<u8>::default().split_sequences(&[]);
        assert!(dag.is_empty());
    }

    #[test]
    fn test_buckets_rank_by_occurrences() {
        // 'x' occurs 4 times in 2 rests, 'y' 3 times in 3 rests; 'x' is
        // visited first, so its group wins the tie on length.
        let inputs = vec![
            vec!['x', 'x', 'x'],
            vec!['x', 'y'],
            vec!['y', 'z'],
            vec!['y', 'w'],
        ];
        let dag = GreedySplitter::new(Comparison::exact()).split_sequences(&inputs);

        assert_eq!(dag.nodes()[4].collection(), &vec!['x']);
        assert_eq!(dag.nodes()[1].imports()[0], NodeId::new(4));
        let mut rebuilt = dag.reconstruct(NodeId::new(0)).unwrap();
        rebuilt.sort();
        assert_eq!(rebuilt, vec!['x', 'x', 'x']);
        assert!(!shared_anywhere(&dag));
    }

    #[test]
    fn test_repeats_inside_one_rest_stop_the_loop() {
        let dag = GreedySplitter::new(Comparison::natural())
            .split_sequences(&[vec![1, 1, 1, 2], vec![3]]);
        assert_eq!(dag.generated_count(), 0);
        assert_eq!(dag.nodes()[0].rest(), &vec![1, 1, 1, 2]);
    }
}
