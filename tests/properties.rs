//! Property tests: every splitter's output reconstructs its inputs, is
//! acyclic with strictly increasing depths, and is reproducible.

use std::collections::{BTreeSet, HashMap, HashSet};

use extraction_kernel::{
    split_shallow, Collection, Comparison, Dag, DagMetrics, GreedySplitter, WeightedSplitter,
};
use proptest::prelude::*;

fn family_of_sets() -> impl Strategy<Value = Vec<BTreeSet<u8>>> {
    prop::collection::vec(prop::collection::btree_set(0u8..16, 0..8), 0..8)
}

fn family_of_sequences() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..10, 0..8), 0..7)
}

/// Roots carry the inputs, the list is well formed and every root
/// reconstructs.
fn assert_sound<C>(dag: &Dag<C>, inputs: &[C]) -> Result<(), TestCaseError>
where
    C: Collection + PartialEq + std::fmt::Debug,
{
    prop_assert_eq!(dag.root_count(), inputs.len());
    for (id, root) in dag.roots() {
        prop_assert_eq!(root.collection(), &inputs[id.index()]);
    }
    prop_assert!(dag.validate().is_ok());
    let summary = DagMetrics::compute(dag);
    prop_assert!(summary.is_ok(), "{:?}", summary);
    Ok(())
}

/// Whether some element is left in the rests of two different nodes.
fn rests_share<C: Collection>(dag: &Dag<C>) -> bool {
    let mut holders: HashMap<&C::Item, usize> = HashMap::new();
    for (_, node) in dag.iter() {
        let mut seen = HashSet::new();
        for item in node.rest().items() {
            if seen.insert(item) {
                *holders.entry(item).or_insert(0) += 1;
            }
        }
    }
    holders.values().any(|&n| n >= 2)
}

proptest! {
    #[test]
    fn shallow_sets_sound(inputs in family_of_sets()) {
        let dag = split_shallow(&inputs);
        assert_sound(&dag, &inputs)?;
        prop_assert!(dag.max_depth() <= 1);
    }

    #[test]
    fn shallow_sequences_sound(inputs in family_of_sequences()) {
        assert_sound(&split_shallow(&inputs), &inputs)?;
    }

    #[test]
    fn shallow_is_idempotent(inputs in family_of_sequences()) {
        prop_assert_eq!(split_shallow(&inputs), split_shallow(&inputs));
    }

    #[test]
    fn greedy_sequences_reach_fixpoint(inputs in family_of_sequences()) {
        for comparison in [Comparison::exact(), Comparison::natural()] {
            let dag = GreedySplitter::new(comparison).split_sequences(&inputs);
            assert_sound(&dag, &inputs)?;
            prop_assert!(!rests_share(&dag));
        }
    }

    #[test]
    fn greedy_sets_reach_fixpoint(inputs in family_of_sets()) {
        let dag = GreedySplitter::new(Comparison::natural()).split_sets(&inputs);
        assert_sound(&dag, &inputs)?;
        prop_assert!(!rests_share(&dag));
    }

    #[test]
    fn weighted_sets_sound_and_disjoint(inputs in family_of_sets()) {
        let dag = WeightedSplitter::canonical().split_sets(&inputs);
        assert_sound(&dag, &inputs)?;
        prop_assert!(!rests_share(&dag));
    }

    #[test]
    fn weighted_sequences_sound(inputs in family_of_sequences()) {
        let dag = WeightedSplitter::canonical().split_sequences(&inputs);
        assert_sound(&dag, &inputs)?;
    }

    #[test]
    fn weighted_is_deterministic(inputs in family_of_sets()) {
        let splitter = WeightedSplitter::canonical();
        prop_assert_eq!(
            splitter.split_sets(&inputs).fingerprint(),
            splitter.split_sets(&inputs).fingerprint()
        );
    }
}
