//! Core types for the extraction kernel.

pub mod collection;
pub mod node;
pub mod dag;

pub use collection::{Collection, Comparator, Comparison};
pub use node::{Node, NodeId};
pub use dag::{Dag, DagError};
