//! Arena of extraction nodes.
//!
//! A [`Dag`] is the flat node list a splitter returns: roots first (one per
//! input, in input order), generated nodes after them in creation order.
//! Edges are parent → child [`NodeId`] lists, so shared children need no
//! reference counting.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::collection::Collection;
use super::node::{Node, NodeId};
use crate::canonical::SchemaEnvelope;

/// Structural defect in a node list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DagError {
    /// An import or a lookup points outside the arena.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    /// A node transitively imports itself.
    #[error("Import cycle through node {0}")]
    Cycle(NodeId),
    /// A child is not strictly deeper than one of its importers.
    #[error("Depth does not increase along import {parent} -> {child}")]
    DepthOrder {
        /// Importing node.
        parent: NodeId,
        /// Imported node.
        child: NodeId,
    },
}

/// Flat list of nodes produced by one splitter call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dag<C> {
    nodes: Vec<Node<C>>,
    root_count: usize,
}

impl<C> Default for Dag<C> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root_count: 0,
        }
    }
}

impl<C> Dag<C> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a root. Roots must all be pushed before any generated node.
    pub(crate) fn push_root(&mut self, node: Node<C>) -> NodeId {
        debug_assert_eq!(self.root_count, self.nodes.len(), "roots must precede generated nodes");
        self.root_count += 1;
        self.push(node)
    }

    /// Append a generated node.
    pub(crate) fn push(&mut self, node: Node<C>) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
        &mut self.nodes[id.index()]
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&Node<C>> {
        self.nodes.get(id.index())
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the list is empty (no inputs were given).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of roots (= number of inputs).
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Number of generated nodes.
    pub fn generated_count(&self) -> usize {
        self.nodes.len() - self.root_count
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node<C>] {
        &self.nodes
    }

    /// Consume the list, keeping creation order.
    pub fn into_nodes(self) -> Vec<Node<C>> {
        self.nodes
    }

    /// Handles and nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<C>)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId::new(i), n))
    }

    /// Root nodes, in input order.
    pub fn roots(&self) -> impl Iterator<Item = (NodeId, &Node<C>)> + '_ {
        self.iter().take(self.root_count)
    }

    /// Generated nodes, in creation order.
    pub fn generated(&self) -> impl Iterator<Item = (NodeId, &Node<C>)> + '_ {
        self.iter().skip(self.root_count)
    }

    /// Deepest node's depth (0 for an empty list).
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Rebuild the list with translated collections; imports and depths are
    /// carried over unchanged.
    pub(crate) fn map_collections<D, F>(self, mut f: F) -> Dag<D>
    where
        F: FnMut(NodeId, C, C) -> (D, D),
    {
        let root_count = self.root_count;
        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let (collection, rest, imports, depth) = node.into_parts();
                let (collection, rest) = f(NodeId::new(i), collection, rest);
                Node::from_parts(collection, rest, imports, depth)
            })
            .collect();
        Dag { nodes, root_count }
    }

    /// Resolve depths from the import edges.
    ///
    /// Nodes nobody imports get depth 0; every other node gets
    /// `1 + max(depth of its importers)`, resolved in topological order.
    ///
    /// # Panics
    ///
    /// If the import graph has a cycle. Splitters never build one.
    pub(crate) fn assign_depths(&mut self) {
        let n = self.nodes.len();
        let mut pending = vec![0usize; n];
        for node in &self.nodes {
            for child in node.imports() {
                pending[child.index()] += 1;
            }
        }

        let mut depth = vec![0usize; n];
        let mut ready: VecDeque<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut resolved = 0;
        while let Some(i) = ready.pop_front() {
            resolved += 1;
            for child in self.nodes[i].imports() {
                let c = child.index();
                depth[c] = depth[c].max(depth[i] + 1);
                pending[c] -= 1;
                if pending[c] == 0 {
                    ready.push_back(c);
                }
            }
        }
        assert_eq!(resolved, n, "import graph contains a cycle");

        for (node, d) in self.nodes.iter_mut().zip(depth) {
            node.set_depth(d);
        }
    }

    /// Check handle ranges, acyclicity and that depth strictly increases
    /// along every import edge.
    pub fn validate(&self) -> Result<(), DagError> {
        let n = self.nodes.len();
        let mut pending = vec![0usize; n];
        for node in &self.nodes {
            for child in node.imports() {
                if child.index() >= n {
                    return Err(DagError::UnknownNode(*child));
                }
                pending[child.index()] += 1;
            }
        }

        let mut ready: Vec<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut resolved = 0;
        while let Some(i) = ready.pop() {
            resolved += 1;
            for child in self.nodes[i].imports() {
                let c = child.index();
                pending[c] -= 1;
                if pending[c] == 0 {
                    ready.push(c);
                }
            }
        }
        if resolved != n {
            let stuck = (0..n).find(|&i| pending[i] > 0).unwrap_or(0);
            return Err(DagError::Cycle(NodeId::new(stuck)));
        }

        for (parent, node) in self.iter() {
            for &child in node.imports() {
                if self.node(child).depth() <= node.depth() {
                    return Err(DagError::DepthOrder { parent, child });
                }
            }
        }
        Ok(())
    }

    /// Canonical fingerprint of the whole list (xxh64 of the canonical JSON,
    /// wrapped with the schema version).
    ///
    /// Equal fingerprints mean equal collections, rests, edges and depths.
    pub fn fingerprint(&self) -> String
    where
        C: Serialize,
    {
        SchemaEnvelope::current(self).hash_hex()
    }
}

impl<C: Collection> Dag<C> {
    /// One root per input, each holding a copy of the input untouched.
    pub(crate) fn from_roots(inputs: &[C]) -> Self {
        let mut dag = Self::new();
        for input in inputs {
            dag.push_root(Node::root(input.clone()));
        }
        dag
    }

    /// Materialize a node: its `rest` plus, recursively, every import.
    ///
    /// Shared children contribute once per import edge, so the result is
    /// the multiset the node stands for.
    pub fn reconstruct(&self, id: NodeId) -> Result<Vec<C::Item>, DagError> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut out = Vec::new();
        self.collect_into(id, &mut on_path, &mut out)?;
        Ok(out)
    }

    fn collect_into(
        &self,
        id: NodeId,
        on_path: &mut [bool],
        out: &mut Vec<C::Item>,
    ) -> Result<(), DagError> {
        let node = self.get(id).ok_or(DagError::UnknownNode(id))?;
        if on_path[id.index()] {
            return Err(DagError::Cycle(id));
        }
        on_path[id.index()] = true;
        out.extend(node.rest().items().cloned());
        for &child in node.imports() {
            self.collect_into(child, on_path, out)?;
        }
        on_path[id.index()] = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two roots sharing one generated node, which shares a deeper one.
    fn diamond() -> Dag<Vec<u32>> {
        let mut dag = Dag::new();
        dag.push_root(Node::from_parts(vec![1, 2, 3], vec![1], vec![NodeId::new(2)], 0));
        dag.push_root(Node::from_parts(vec![2, 3, 4], vec![4], vec![NodeId::new(2)], 0));
        dag.push(Node::from_parts(vec![2, 3], vec![2], vec![NodeId::new(3)], 9));
        dag.push(Node::from_parts(vec![3], vec![3], vec![], 9));
        dag
    }

    #[test]
    fn test_assign_depths_longest_path() {
        let mut dag = diamond();
        // Extra edge root0 -> n3 must not shorten n3's depth.
        dag.node_mut(NodeId::new(0)).delegate(NodeId::new(3), &vec![]);
        dag.assign_depths();

        let depths: Vec<usize> = dag.nodes().iter().map(Node::depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 2]);
        assert_eq!(dag.max_depth(), 2);
        assert!(dag.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn test_assign_depths_rejects_cycle() {
        let mut dag = diamond();
        dag.node_mut(NodeId::new(3)).delegate(NodeId::new(2), &vec![]);
        dag.assign_depths();
    }

    #[test]
    fn test_reconstruct_expands_shared_children() {
        let mut dag = diamond();
        dag.assign_depths();

        let mut first = dag.reconstruct(NodeId::new(0)).unwrap();
        first.sort();
        assert_eq!(first, vec![1, 2, 3]);

        let mut second = dag.reconstruct(NodeId::new(1)).unwrap();
        second.sort();
        assert_eq!(second, vec![2, 3, 4]);
    }

    #[test]
    fn test_validate_reports_defects() {
        let mut dag = diamond();
        dag.assign_depths();
        dag.node_mut(NodeId::new(3)).set_depth(1);
        assert_eq!(
            dag.validate(),
            Err(DagError::DepthOrder {
                parent: NodeId::new(2),
                child: NodeId::new(3),
            })
        );

        dag.node_mut(NodeId::new(3)).delegate(NodeId::new(2), &vec![]);
        assert!(matches!(dag.validate(), Err(DagError::Cycle(_))));
        assert!(matches!(dag.reconstruct(NodeId::new(0)), Err(DagError::Cycle(_))));

        let mut dangling = diamond();
        dangling.node_mut(NodeId::new(3)).delegate(NodeId::new(42), &vec![]);
        assert_eq!(dangling.validate(), Err(DagError::UnknownNode(NodeId::new(42))));
    }

    #[test]
    fn test_roots_and_generated_partition() {
        let dag = diamond();
        assert_eq!(dag.root_count(), 2);
        assert_eq!(dag.generated_count(), 2);
        assert_eq!(dag.roots().count() + dag.generated().count(), dag.len());
        assert_eq!(dag.generated().next().map(|(id, _)| id), Some(NodeId::new(2)));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = diamond();
        let mut b = diamond();
        a.assign_depths();
        b.assign_depths();
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.node_mut(NodeId::new(1)).delegate(NodeId::new(3), &vec![4]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
