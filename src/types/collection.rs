//! Collection shapes the splitters operate on.
//!
//! A collection is either a *set* ([`BTreeSet<T>`], unique elements) or a
//! *sequence* ([`Vec<T>`], order significant, duplicates allowed). Both expose
//! the same multiset-flavoured operations through [`Collection`], which is all
//! the node model and the metrics pass need.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A set or a sequence of elements.
///
/// For sequences, `contains_all` and `remove_all` use multiset semantics:
/// `[1, 1, 2]` contains `[1, 2]` but not `[2, 2]`, and removing `[1]` drops
/// only the first `1`.
pub trait Collection: Clone {
    /// Element type.
    type Item: Clone + Eq + Hash;

    /// Build a collection from elements in iteration order.
    fn from_items<I: IntoIterator<Item = Self::Item>>(items: I) -> Self;

    /// Number of elements, counting duplicates.
    fn len(&self) -> usize;

    /// Whether the collection holds no element.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in the collection's own order.
    fn items(&self) -> impl Iterator<Item = &Self::Item>;

    /// Whether `item` occurs at least once.
    fn contains_item(&self, item: &Self::Item) -> bool;

    /// Whether every element of `other` occurs here (with multiplicity).
    fn contains_all(&self, other: &Self) -> bool;

    /// Remove every element of `other` (one occurrence per occurrence in `other`).
    fn remove_all(&mut self, other: &Self);

    /// Occurrence count per distinct element.
    fn counts(&self) -> HashMap<&Self::Item, usize> {
        let mut counts = HashMap::new();
        for item in self.items() {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }
}

impl<T: Ord + Clone + Hash> Collection for BTreeSet<T> {
    type Item = T;

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_item(&self, item: &T) -> bool {
        self.contains(item)
    }

    fn contains_all(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    fn remove_all(&mut self, other: &Self) {
        if other.len() < self.len() {
            for item in other {
                self.remove(item);
            }
        } else {
            self.retain(|item| !other.contains(item));
        }
    }
}

impl<T: Clone + Eq + Hash> Collection for Vec<T> {
    type Item = T;

    fn from_items<I: IntoIterator<Item = T>>(items: I) -> Self {
        items.into_iter().collect()
    }

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    fn contains_item(&self, item: &T) -> bool {
        self.contains(item)
    }

    fn contains_all(&self, other: &Self) -> bool {
        if other.len() > self.len() {
            return false;
        }
        let have = self.counts();
        other
            .counts()
            .into_iter()
            .all(|(item, need)| have.get(item).copied().unwrap_or(0) >= need)
    }

    fn remove_all(&mut self, other: &Self) {
        let mut pending = other.counts();
        self.retain(|item| match pending.get_mut(item) {
            Some(left) if *left > 0 => {
                *left -= 1;
                false
            }
            _ => true,
        });
    }
}

/// Intersection of two sets: the smaller one is scanned against the larger.
pub fn intersect_sets<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|item| large.contains(*item)).cloned().collect()
}

/// Caller-supplied total order over elements.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// How two sequences are intersected.
///
/// - `Exact`: pairwise equality scan, O(n·m), result in the first operand's order.
/// - `Ordered`: both operands sorted with the comparator, then a two-pointer
///   merge, O(n + m) once prepared. The comparator must agree with `Eq`
///   (`cmp(a, b) == Equal` iff `a == b`); otherwise extracted groups may not
///   be found again by equality and extraction stops early.
#[derive(Clone)]
pub enum Comparison<T> {
    /// Exact pairwise comparison, no ordering assumed.
    Exact,
    /// Sort-then-merge under the given total order.
    Ordered(Comparator<T>),
}

impl<T> Comparison<T> {
    /// Exact pairwise comparison.
    pub fn exact() -> Self {
        Self::Exact
    }

    /// Natural ordering of `T`.
    pub fn natural() -> Self
    where
        T: Ord + 'static,
    {
        Self::Ordered(Arc::new(|a: &T, b: &T| a.cmp(b)))
    }

    /// Caller-supplied total order.
    pub fn by<F>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::Ordered(Arc::new(cmp))
    }

    /// Whether this mode sorts before merging.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }
}

impl<T: Clone + Eq> Comparison<T> {
    /// Bring a sequence into the shape `intersect_prepared` expects.
    ///
    /// Sorting happens once per sequence here rather than once per pair.
    pub fn prepare(&self, items: &[T]) -> Vec<T> {
        let mut prepared = items.to_vec();
        if let Self::Ordered(cmp) = self {
            prepared.sort_by(|a, b| cmp(a, b));
        }
        prepared
    }

    /// Multiset intersection of two prepared sequences.
    pub fn intersect_prepared(&self, a: &[T], b: &[T]) -> Vec<T> {
        match self {
            Self::Exact => {
                let mut used = vec![false; b.len()];
                let mut shared = Vec::new();
                for item in a {
                    if let Some(j) = (0..b.len()).find(|&j| !used[j] && b[j] == *item) {
                        used[j] = true;
                        shared.push(item.clone());
                    }
                }
                shared
            }
            Self::Ordered(cmp) => {
                let (mut i, mut j) = (0, 0);
                let mut shared = Vec::new();
                while i < a.len() && j < b.len() {
                    match cmp(&a[i], &b[j]) {
                        Ordering::Less => i += 1,
                        Ordering::Greater => j += 1,
                        Ordering::Equal => {
                            shared.push(a[i].clone());
                            i += 1;
                            j += 1;
                        }
                    }
                }
                shared
            }
        }
    }

    /// Multiset intersection of two raw sequences.
    pub fn intersect(&self, a: &[T], b: &[T]) -> Vec<T> {
        self.intersect_prepared(&self.prepare(a), &self.prepare(b))
    }
}

impl<T> Default for Comparison<T> {
    fn default() -> Self {
        Self::Exact
    }
}

impl<T> fmt::Debug for Comparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "Exact"),
            Self::Ordered(_) => write!(f, "Ordered(..)"),
        }
    }
}
