//! One folding pass: group, pad, hash

use crate::model::{Hash, HashAlgorithm};

/// Hash one full group into its parent digest
///
/// Members are concatenated in order as lowercase hex text before hashing,
/// so a parent over `[a, b, c]` is `H(hex(a) ‖ hex(b) ‖ hex(c))`.
pub fn combine_group(group: &[Hash], algorithm: HashAlgorithm) -> Hash {
    let mut text = Vec::with_capacity(group.len() * 64);
    let mut buf = [0u8; 64];
    for member in group {
        member.encode_hex(&mut buf);
        text.extend_from_slice(&buf);
    }
    algorithm.digest(&text)
}

/// Member `slot` of group `group_index` at a level of `len` nodes
///
/// Slots past the end of the level repeat the level's last node, which is
/// how the final short group is padded up to `k`.
pub fn group_member(nodes: &[Hash], group_index: usize, k: usize, slot: usize) -> Hash {
    let idx = (group_index * k + slot).min(nodes.len() - 1);
    nodes[idx]
}

/// Members of group `group_index` after padding to `k`
pub fn padded_group(nodes: &[Hash], group_index: usize, k: usize) -> Vec<Hash> {
    (0..k)
        .map(|slot| group_member(nodes, group_index, k, slot))
        .collect()
}

/// Number of nodes the next level will have
pub fn parent_count(len: usize, k: usize) -> usize {
    len.div_ceil(k)
}

/// Fold a level of `nodes` into its parents using branching factor `k`
///
/// `nodes` must be non-empty.
pub fn fold_level(nodes: &[Hash], k: usize, algorithm: HashAlgorithm) -> Vec<Hash> {
    (0..parent_count(nodes.len(), k))
        .map(|group_index| combine_group(&padded_group(nodes, group_index, k), algorithm))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> Hash {
        HashAlgorithm::Sha256.digest(&[n])
    }

    #[test]
    fn test_combine_is_hex_concatenation() {
        let (a, b) = (leaf(1), leaf(2));
        let expected = HashAlgorithm::Sha256.digest(format!("{}{}", a, b).as_bytes());
        assert_eq!(combine_group(&[a, b], HashAlgorithm::Sha256), expected);
    }

    #[test]
    fn test_fold_pads_last_group() {
        let nodes: Vec<Hash> = (0..4).map(leaf).collect();
        let folded = fold_level(&nodes, 3, HashAlgorithm::Sha256);

        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0], combine_group(&nodes[0..3], HashAlgorithm::Sha256));
        assert_eq!(
            folded[1],
            combine_group(&[nodes[3], nodes[3], nodes[3]], HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn test_fold_and_proof_groups_agree() {
        let algorithm = HashAlgorithm::Sha256;
        for (len, k) in [(1, 2), (7, 5), (10, 5), (13, 8), (100, 55)] {
            let nodes: Vec<Hash> = (0..len).map(|i| leaf(i as u8)).collect();
            let folded = fold_level(&nodes, k, algorithm);
            assert_eq!(folded.len(), parent_count(len, k));
            for (g, parent) in folded.iter().enumerate() {
                assert_eq!(*parent, combine_group(&padded_group(&nodes, g, k), algorithm));
            }
        }
    }

    #[test]
    fn test_combine_pads_with_copies_of_last() {
        let (a, b) = (leaf(1), leaf(2));
        let expected = HashAlgorithm::Blake3.digest(format!("{}{}{}", a, b, b).as_bytes());
        let folded = fold_level(&[a, b], 3, HashAlgorithm::Blake3);
        assert_eq!(folded, vec![expected]);
    }

    #[test]
    fn test_padded_group_matches_fold() {
        let nodes: Vec<Hash> = (0..7).map(leaf).collect();
        assert_eq!(
            padded_group(&nodes, 1, 5),
            vec![nodes[5], nodes[6], nodes[6], nodes[6], nodes[6]]
        );
        assert_eq!(parent_count(7, 5), 2);
        assert_eq!(parent_count(10, 5), 2);
        assert_eq!(parent_count(1, 2), 1);
    }
}
