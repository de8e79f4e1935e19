//! Splitters: turn a family of collections into an extraction DAG.
//!
//! | splitter            | input     | groups                         |
//! |---------------------|-----------|--------------------------------|
//! | [`split_shallow`]   | either    | one singleton per shared element |
//! | [`GreedySplitter`]  | sequences | largest shared group first     |
//! | [`WeightedSplitter`]| sets      | best-weighted intersection first |
//!
//! Every splitter returns roots first (input order), then generated nodes in
//! creation order.

pub mod greedy;
pub(crate) mod overlap;
pub mod shallow;
pub mod weighted;

pub use greedy::GreedySplitter;
pub use shallow::split_shallow;
pub use weighted::{JoinFn, SplitFn, WeightedSplitter};
