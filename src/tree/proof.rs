//! Inclusion proofs for Phi-Merkle trees
//!
//! A proof carries, for every fold between a leaf and the root, the other
//! members of the leaf's group and the branching factor used. Because the
//! factor depends on how many nodes were left at that level, a verifier
//! recomputes each level's node count from `leaf_count` and rejects any
//! step whose recorded factor disagrees with the table.

use super::level::{combine_group, parent_count};
use crate::config::PhiConfig;
use crate::model::{Hash, HashAlgorithm};
use crate::sequence::BranchingTable;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One fold on the path from a leaf to the root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Group size at this level
    pub branching_factor: usize,
    /// Slot of the proven node within its group
    pub position: usize,
    /// The group's other members in slot order, padding duplicates included
    pub siblings: Vec<Hash>,
}

/// Proof that a leaf sits at `leaf_index` of a tree over `leaf_count` leaves
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub leaf_index: usize,
    pub leaf_count: usize,
    pub steps: Vec<ProofStep>,
}

impl InclusionProof {
    /// Check that `leaf` folds up to `root`
    pub fn verify(
        &self,
        leaf: &Hash,
        root: &Hash,
        algorithm: HashAlgorithm,
        table: &BranchingTable,
    ) -> bool {
        if self.leaf_index >= self.leaf_count {
            return false;
        }

        let mut count = self.leaf_count;
        let mut idx = self.leaf_index;
        let mut current = *leaf;

        for step in &self.steps {
            if count == 1 {
                return false;
            }
            let k = table.select(count);
            if step.branching_factor != k
                || step.siblings.len() != k - 1
                || step.position != idx % k
            {
                return false;
            }

            let mut group = step.siblings.clone();
            group.insert(step.position, current);

            // the last group is padded with copies of its last real member
            let group_start = idx - step.position;
            let real = k.min(count - group_start);
            if group[real..].iter().any(|h| *h != group[real - 1]) {
                return false;
            }

            current = combine_group(&group, algorithm);
            count = parent_count(count, k);
            idx /= k;
        }

        count == 1 && current == *root
    }

    /// Verify using the hash and branching cap from `config`
    pub fn verify_with_config(
        &self,
        leaf: &Hash,
        root: &Hash,
        config: &PhiConfig,
    ) -> Result<bool> {
        let table = config.branching_table()?;
        Ok(self.verify(leaf, root, config.hash_algorithm, &table))
    }

    /// Encode to a compact binary form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from the binary form produced by [`to_bytes`](Self::to_bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
