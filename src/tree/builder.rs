//! Phi-Merkle tree construction

use super::level::{fold_level, padded_group};
use super::proof::{InclusionProof, ProofStep};
use crate::config::PhiConfig;
use crate::model::{EntangledDataObject, Hash, HashAlgorithm};
use crate::sequence::BranchingTable;
use crate::{Error, Result};

/// A Merkle tree whose fan-out is re-chosen at every level
///
/// At each fold the branching factor is the largest table entry not
/// exceeding the number of nodes left, so a tree over 4 leaves folds 3-wide
/// and then 2-wide. The root is a pure function of the ordered leaves and
/// the configuration; reordering leaves changes it.
///
/// Built once from a full leaf sequence. Adding or removing leaves means
/// building a new tree.
#[derive(Clone, Debug)]
pub struct PhiMerkleTree {
    /// levels[0] are the leaves, the last level holds only the root
    levels: Vec<Vec<Hash>>,
    /// Fan-out used to fold levels[i] into levels[i + 1]
    branching_factors: Vec<usize>,
    algorithm: HashAlgorithm,
    table: BranchingTable,
}

impl PhiMerkleTree {
    /// Build a tree with the default configuration
    pub fn build(leaves: Vec<Hash>) -> Result<Self> {
        Self::build_with(leaves, &PhiConfig::default())
    }

    /// Build a tree using the hash and branching cap from `config`
    pub fn build_with(leaves: Vec<Hash>, config: &PhiConfig) -> Result<Self> {
        Self::build_raw(leaves, config.hash_algorithm, config.branching_table()?)
    }

    /// Build a tree over the leaf digests of `edos`, in order
    pub fn from_edos(edos: &[EntangledDataObject], config: &PhiConfig) -> Result<Self> {
        let leaves = edos.iter().map(EntangledDataObject::leaf_data).collect();
        Self::build_with(leaves, config)
    }

    /// Build a tree from hex-rendered leaf digests
    pub fn from_hex<S: AsRef<str>>(leaves: &[S], config: &PhiConfig) -> Result<Self> {
        let leaves = leaves
            .iter()
            .map(|s| s.as_ref().parse::<Hash>())
            .collect::<Result<Vec<_>>>()?;
        Self::build_with(leaves, config)
    }

    fn build_raw(
        leaves: Vec<Hash>,
        algorithm: HashAlgorithm,
        table: BranchingTable,
    ) -> Result<Self> {
        if leaves.is_empty() {
            return Err(Error::EmptyLeafSet);
        }

        let mut levels = vec![leaves];
        let mut branching_factors = Vec::new();

        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }
            let k = table.select(current.len());
            let next = fold_level(current, k, algorithm);
            tracing::debug!(
                level = levels.len() - 1,
                nodes = current.len(),
                branching_factor = k,
                padding = (k - current.len() % k) % k,
                "folded tree level"
            );
            branching_factors.push(k);
            levels.push(next);
        }

        Ok(PhiMerkleTree {
            levels,
            branching_factors,
            algorithm,
            table,
        })
    }

    /// The root digest
    pub fn root(&self) -> Hash {
        self.levels[self.levels.len() - 1][0]
    }

    /// The leaf digests in build order
    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// Always false: a tree has at least one leaf
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All levels, leaves first and `[root]` last
    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Branching factor used at each fold, bottom up
    pub fn branching_factors(&self) -> &[usize] {
        &self.branching_factors
    }

    /// Number of folds between the leaves and the root
    pub fn depth(&self) -> usize {
        self.branching_factors.len()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn branching_table(&self) -> BranchingTable {
        self.table
    }

    /// Inclusion proof for the leaf at `index`
    pub fn prove(&self, index: usize) -> Result<InclusionProof> {
        let leaf_count = self.len();
        if index >= leaf_count {
            return Err(Error::LeafIndexOutOfRange {
                index,
                len: leaf_count,
            });
        }

        let mut steps = Vec::with_capacity(self.depth());
        let mut idx = index;
        for (nodes, &k) in self.levels.iter().zip(&self.branching_factors) {
            let position = idx % k;
            let group = padded_group(nodes, idx / k, k);
            let siblings = group
                .into_iter()
                .enumerate()
                .filter(|(slot, _)| *slot != position)
                .map(|(_, h)| h)
                .collect();
            steps.push(ProofStep {
                branching_factor: k,
                position,
                siblings,
            });
            idx /= k;
        }

        Ok(InclusionProof {
            leaf_index: index,
            leaf_count,
            steps,
        })
    }

    /// Verify a proof against this tree's root and parameters
    pub fn verify_proof(&self, proof: &InclusionProof, leaf: &Hash) -> bool {
        proof.verify(leaf, &self.root(), self.algorithm, &self.table)
    }
}

/// Root digest of `leaves` under the default configuration
pub fn build_tree(leaves: &[Hash]) -> Result<Hash> {
    Ok(PhiMerkleTree::build(leaves.to_vec())?.root())
}
