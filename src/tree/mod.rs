//! Phi-Merkle tree: variable-fan-out aggregation of leaf digests
//!
//! - Each fold groups the current level into runs of `k` consecutive nodes
//! - `k` is the largest Fibonacci table entry not exceeding the level size
//! - A short final group is padded by repeating its last node
//! - Folding repeats until a single digest, the root, remains

mod builder;
mod level;
mod proof;

pub use builder::{build_tree, PhiMerkleTree};
pub use level::{combine_group, fold_level};
pub use proof::{InclusionProof, ProofStep};
