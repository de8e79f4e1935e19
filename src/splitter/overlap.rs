//! Live index of pairwise intersections for the weighted splitter.
//!
//! Four cross-indexed structures, kept consistent by every operation:
//!
//! | structure      | maps                                   |
//! |----------------|----------------------------------------|
//! | `pairs`        | key → participant pairs that produced it |
//! | `participants` | key → set → number of pairs it is in    |
//! | `by_set`       | set → keys it participates in           |
//! | `buckets`      | quantized primary weight → keys         |
//!
//! A key is the caller's encoding of an intersection (see
//! `WeightedSplitter`); its element count is recorded at insertion so
//! weights never need to decode it.

use std::collections::{BTreeMap, BTreeSet};

use crate::policy::scoring::{Candidate, WeightFn};
use crate::policy::quantize_weight;
use crate::types::NodeId;

/// Two sets whose rests intersect, smaller handle first.
pub(crate) type Pair = (NodeId, NodeId);

pub(crate) fn pair(a: NodeId, b: NodeId) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    size: usize,
    /// `None` until the first weighing.
    bucket: Option<i64>,
}

#[cfg(test)]
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IndexSnapshot<K> {
    pairs: BTreeMap<K, Vec<Pair>>,
    participants: BTreeMap<K, BTreeMap<NodeId, usize>>,
    by_set: BTreeMap<NodeId, BTreeSet<K>>,
    buckets: BTreeMap<i64, BTreeSet<K>>,
    slots: BTreeMap<K, (usize, Option<i64>)>,
}

pub(crate) struct OverlapIndex<K> {
    pairs: BTreeMap<K, Vec<Pair>>,
    participants: BTreeMap<K, BTreeMap<NodeId, usize>>,
    by_set: BTreeMap<NodeId, BTreeSet<K>>,
    buckets: BTreeMap<i64, BTreeSet<K>>,
    slots: BTreeMap<K, Slot>,
    primary: WeightFn,
    secondary: WeightFn,
}

impl<K: Ord + Clone> OverlapIndex<K> {
    pub fn new(primary: WeightFn, secondary: WeightFn) -> Self {
        Self {
            pairs: BTreeMap::new(),
            participants: BTreeMap::new(),
            by_set: BTreeMap::new(),
            buckets: BTreeMap::new(),
            slots: BTreeMap::new(),
            primary,
            secondary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Record that `pair` intersects in the `size` elements encoded by `key`.
    pub fn insert(&mut self, key: K, size: usize, pair: Pair) {
        let pairs = self.pairs.entry(key.clone()).or_default();
        if pairs.contains(&pair) {
            return;
        }
        pairs.push(pair);

        let participants = self.participants.entry(key.clone()).or_default();
        for set in [pair.0, pair.1] {
            *participants.entry(set).or_insert(0) += 1;
            self.by_set.entry(set).or_default().insert(key.clone());
        }
        self.slots.entry(key.clone()).or_insert(Slot {
            size,
            bucket: None,
        });
        self.rebucket(&key);
    }

    /// Drop one pair's contribution of `set` to `key`; forgets the set once
    /// no pair links it to the key any more.
    pub fn remove_participant(&mut self, key: &K, set: NodeId) {
        let Some(participants) = self.participants.get_mut(key) else {
            return;
        };
        let gone = match participants.get_mut(&set) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if gone {
            participants.remove(&set);
            if let Some(keys) = self.by_set.get_mut(&set) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_set.remove(&set);
                }
            }
        }
    }

    /// Remove one pair from `key`. The key disappears with its last pair;
    /// otherwise it moves to the bucket of its new weight.
    pub fn remove_pair(&mut self, key: &K, pair: Pair) {
        let Some(pairs) = self.pairs.get_mut(key) else {
            return;
        };
        let Some(pos) = pairs.iter().position(|p| *p == pair) else {
            return;
        };
        pairs.swap_remove(pos);
        let emptied = pairs.is_empty();

        self.remove_participant(key, pair.0);
        self.remove_participant(key, pair.1);
        if emptied {
            self.remove_key(key);
        } else {
            self.rebucket(key);
        }
    }

    /// Remove a key and all its bookkeeping; returns the pairs it held.
    pub fn remove_key(&mut self, key: &K) -> Vec<Pair> {
        let pairs = self.pairs.remove(key).unwrap_or_default();
        if let Some(participants) = self.participants.remove(key) {
            for set in participants.keys() {
                if let Some(keys) = self.by_set.get_mut(set) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.by_set.remove(set);
                    }
                }
            }
        }
        if let Some(bucket) = self.slots.remove(key).and_then(|slot| slot.bucket) {
            self.unbucket(key, bucket);
        }
        pairs
    }

    /// The key to extract next: highest primary weight, then highest
    /// secondary weight on live counts, then smallest key.
    pub fn select_max(&self) -> Option<K> {
        let (&weight, keys) = self.buckets.iter().next_back()?;
        keys.iter()
            .map(|key| {
                let size = self.size(key);
                let sets = self.participant_count(key);
                Candidate {
                    key,
                    primary: weight,
                    secondary: quantize_weight((self.secondary)(size, sets)),
                }
            })
            .max()
            .map(|candidate| candidate.key.clone())
    }

    /// Sets currently sharing `key`.
    pub fn participants(&self, key: &K) -> Vec<NodeId> {
        self.participants
            .get(key)
            .map(|p| p.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn participant_count(&self, key: &K) -> usize {
        self.participants.get(key).map_or(0, BTreeMap::len)
    }

    pub fn pairs(&self, key: &K) -> &[Pair] {
        self.pairs.get(key).map_or(&[], Vec::as_slice)
    }

    /// Keys `set` participates in, in key order.
    pub fn keys_of(&self, set: NodeId) -> Vec<K> {
        self.by_set
            .get(&set)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn size(&self, key: &K) -> usize {
        self.slots.get(key).map_or(0, |s| s.size)
    }

    #[cfg(test)]
    pub fn weight(&self, key: &K) -> Option<i64> {
        self.slots.get(key).and_then(|s| s.bucket)
    }

    /// Order-independent copy of every table, for comparing two indexes.
    #[cfg(test)]
    pub fn snapshot(&self) -> IndexSnapshot<K> {
        IndexSnapshot {
            pairs: self
                .pairs
                .iter()
                .map(|(key, pairs)| {
                    let mut pairs = pairs.clone();
                    pairs.sort();
                    (key.clone(), pairs)
                })
                .collect(),
            participants: self.participants.clone(),
            by_set: self.by_set.clone(),
            buckets: self.buckets.clone(),
            slots: self
                .slots
                .iter()
                .map(|(key, slot)| (key.clone(), (slot.size, slot.bucket)))
                .collect(),
        }
    }

    fn rebucket(&mut self, key: &K) {
        let Some(slot) = self.slots.get(key).copied() else {
            return;
        };
        let weight = quantize_weight((self.primary)(slot.size, self.participant_count(key)));
        match slot.bucket {
            Some(bucket) if bucket == weight => return,
            Some(bucket) => self.unbucket(key, bucket),
            None => {}
        }
        self.buckets.entry(weight).or_default().insert(key.clone());
        if let Some(slot) = self.slots.get_mut(key) {
            slot.bucket = Some(weight);
        }
    }

    fn unbucket(&mut self, key: &K, bucket: i64) {
        if let Some(keys) = self.buckets.get_mut(&bucket) {
            keys.remove(key);
            if keys.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
    }
}
