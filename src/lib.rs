//! # phi_merkle
//!
//! A content-addressed aggregation primitive: a Merkle tree whose
//! branching factor is drawn per level from the Fibonacci sequence, fed by
//! coherence-checked data objects.
//!
//! ## Core Concepts
//!
//! - **Entangled Data Objects**: a digital and a physical state record
//!   bound under one digest, with a flag for whether their canonical
//!   length ratio approximates the golden ratio
//! - **Phi-Merkle Trees**: ordered leaf digests folded into one root, each
//!   level grouped by the largest Fibonacci number that fits
//! - **Inclusion Proofs**: per-level sibling groups that let a verifier
//!   recompute the root from one leaf
//!
//! ## Example
//!
//! ```
//! use phi_merkle::{EntangledDataObject, PhiMerkleTree};
//! use serde_json::json;
//!
//! let edo = EntangledDataObject::new(
//!     &json!({"url": "https://phi.chain"}),
//!     &json!({"sensor": "thermo"}),
//! )?;
//! let tree = PhiMerkleTree::build(vec![edo.leaf_data()])?;
//! assert_eq!(tree.root(), edo.leaf_data());
//! # Ok::<(), phi_merkle::Error>(())
//! ```

pub mod canonical;
pub mod config;
pub mod model;
pub mod sequence;
pub mod tree;

mod error;

pub use canonical::JsonStyle;
pub use config::PhiConfig;
pub use error::{Error, Result};
pub use model::{build_leaf, EntangledDataObject, Hash, HashAlgorithm};
pub use sequence::{select_branching_factor, BranchingTable, PHI, PHI_INV};
pub use tree::{build_tree, InclusionProof, PhiMerkleTree, ProofStep};
