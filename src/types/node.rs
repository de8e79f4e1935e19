//! Nodes of the extraction DAG.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::collection::Collection;

/// Stable handle of a node inside a [`super::Dag`].
///
/// Handles are arena indices: roots take `0..root_count`, generated nodes
/// follow in creation order. Implements `Ord` so handle sets iterate
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a handle from an arena index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of this handle.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A collection plus its extraction bookkeeping.
///
/// - `collection`: the caller's input (roots) or the extracted group (generated)
/// - `rest`: elements of `collection` not delegated to any import
/// - `imports`: children carved out of this node, in attachment order
/// - `depth`: longest import path from a root
///
/// Fields are read-only outside the crate; only splitters mutate `rest` and
/// `imports`, and only through [`Node::delegate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<C> {
    collection: C,
    rest: C,
    imports: Vec<NodeId>,
    depth: usize,
}

impl<C: Collection> Node<C> {
    /// A root wrapping an input collection; nothing delegated yet.
    pub(crate) fn root(collection: C) -> Self {
        Self {
            rest: collection.clone(),
            collection,
            imports: Vec::new(),
            depth: 0,
        }
    }

    /// A freshly extracted group. Depth is provisional until the splitter
    /// resolves it.
    pub(crate) fn generated(collection: C) -> Self {
        Self {
            rest: collection.clone(),
            collection,
            imports: Vec::new(),
            depth: 1,
        }
    }

    /// Move `elements` from `rest` into the import `child`.
    pub(crate) fn delegate(&mut self, child: NodeId, elements: &C) {
        self.rest.remove_all(elements);
        self.imports.push(child);
    }
}

impl<C> Node<C> {
    /// Assemble a node from already-partitioned parts.
    pub(crate) fn from_parts(collection: C, rest: C, imports: Vec<NodeId>, depth: usize) -> Self {
        Self {
            collection,
            rest,
            imports,
            depth,
        }
    }

    /// Split into `(collection, rest, imports, depth)`.
    pub(crate) fn into_parts(self) -> (C, C, Vec<NodeId>, usize) {
        (self.collection, self.rest, self.imports, self.depth)
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// The full collection this node stands for.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Elements not delegated to any import.
    pub fn rest(&self) -> &C {
        &self.rest
    }

    /// Children, in attachment order. May repeat for sequences.
    pub fn imports(&self) -> &[NodeId] {
        &self.imports
    }

    /// Longest import path from a root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this node imports nothing.
    pub fn is_leaf(&self) -> bool {
        self.imports.is_empty()
    }
}
