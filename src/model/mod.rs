//! Core data model types for phi_merkle

mod edo;
mod hash;

pub use edo::{build_leaf, is_phi_coherent, length_ratio, EntangledDataObject};
pub use hash::{Hash, HashAlgorithm};
