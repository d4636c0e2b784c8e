//! Library-level properties of leaves and trees
//!
//! Known-answer digests were produced by the deployment that published the
//! first roots; matching them pins canonicalization, flag text, combine
//! order and padding bit-for-bit.

use phi_merkle::{
    build_leaf, build_tree, select_branching_factor, EntangledDataObject, Hash, HashAlgorithm,
    PhiConfig, PhiMerkleTree,
};
use serde_json::json;

fn numbered_leaves(n: usize) -> Vec<Hash> {
    (0..n)
        .map(|i| HashAlgorithm::Sha256.digest(i.to_string().as_bytes()))
        .collect()
}

fn demo_edos() -> Vec<EntangledDataObject> {
    let pairs = [
        (
            json!({"url": "https://phi.chain", "content": "A".repeat(162)}),
            json!({"coord": "1.618", "sensor": "B".repeat(100)}),
        ),
        (
            json!({"url": "https://flat.torus", "content": "C".repeat(50)}),
            json!({"coord": "9.6.3", "sensor": "D".repeat(100)}),
        ),
        (
            json!({"url": "https://quantum.bridge", "content": "E".repeat(62)}),
            json!({"coord": "2.618", "sensor": "F".repeat(100)}),
        ),
    ];
    pairs
        .iter()
        .map(|(d, p)| EntangledDataObject::new(d, p).unwrap())
        .collect()
}

// ============================================================================
// Known answers
// ============================================================================

#[test]
fn test_demo_leaves_match_published_digests() {
    let edos = demo_edos();
    let expected = [
        "30bbfd2d49bc8563587b71e289141cee9d7253ff40debf1319ff46d387f2f10f",
        "e7b6b7a4842a94a2d3d10b9f1fb04af84219808f0a42046c12a4d4642d9a02c8",
        "e8c45e23f4896504b4c52d63001bc7947523a57561e79ebe5779ac440da090b6",
    ];
    for (edo, hex) in edos.iter().zip(expected) {
        assert_eq!(edo.leaf_data().to_hex(), hex);
        assert!(edo.is_coherent());
        // 205/132, 94/132 and 110/132 are all far from φ and φ⁻¹
        assert!(!edo.coherence_flag());
    }
}

#[test]
fn test_demo_root_is_single_pass_hash() {
    let edos = demo_edos();
    let tree = PhiMerkleTree::from_edos(&edos, &PhiConfig::default()).unwrap();

    let concatenated: String = edos.iter().map(|e| e.leaf_data().to_hex()).collect();
    assert_eq!(
        tree.root(),
        HashAlgorithm::Sha256.digest(concatenated.as_bytes())
    );
    assert_eq!(
        tree.root().to_hex(),
        "1d8d3db0d3873dd19198ac2d79e9171dcce1de125275db17d2e87eda553fd8f9"
    );
    assert_eq!(tree.depth(), 1);
}

#[test]
fn test_known_roots_for_padded_shapes() {
    assert_eq!(
        build_tree(&numbered_leaves(4)).unwrap().to_hex(),
        "2176a3cbfd29199eca76cc823c79e54ef4f2a4c0c33205cbba5eea282d97b9ad"
    );
    assert_eq!(
        build_tree(&numbered_leaves(7)).unwrap().to_hex(),
        "9d67f6aaa5696ccdadaad28d13b3e28363714bd4e3982a73b731ad1387cfb876"
    );
}

#[test]
fn test_legacy_fan_out_cap_reproduces_large_root() {
    // The first deployment capped fan-out at 34
    let config = PhiConfig::default().with_max_branching_factor(34);
    let tree = PhiMerkleTree::build_with(numbered_leaves(100), &config).unwrap();
    assert_eq!(
        tree.root().to_hex(),
        "b11709c3b6664c1ebeccdeac48edabe051b2abe73b2f031672b7194fba29122d"
    );
}

// ============================================================================
// Determinism and order
// ============================================================================

#[test]
fn test_leaf_determinism_across_field_order() {
    let a = json!({"temperature": 21.5, "unit": "C", "tags": ["a", "b"]});
    let mut b = serde_json::Map::new();
    b.insert("unit".into(), json!("C"));
    b.insert("tags".into(), json!(["a", "b"]));
    b.insert("temperature".into(), json!(21.5));
    let physical = json!({"id": 7});

    let first = build_leaf(&a, &physical).unwrap();
    let second = build_leaf(&b, &physical).unwrap();
    let third = build_leaf(&a, &physical).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn test_tree_determinism() {
    for n in [1, 2, 5, 13, 40, 200] {
        let leaves = numbered_leaves(n);
        assert_eq!(build_tree(&leaves).unwrap(), build_tree(&leaves).unwrap());
    }
}

#[test]
fn test_reversal_changes_root() {
    for n in [2, 3, 4, 9, 60] {
        let leaves = numbered_leaves(n);
        let mut reversed = leaves.clone();
        reversed.reverse();
        assert_ne!(
            build_tree(&leaves).unwrap(),
            build_tree(&reversed).unwrap(),
            "n={}",
            n
        );
    }
}

#[test]
fn test_appending_leaf_changes_root() {
    let leaves = numbered_leaves(8);
    let mut more = leaves.clone();
    more.push(numbered_leaves(9)[8]);
    assert_ne!(build_tree(&leaves).unwrap(), build_tree(&more).unwrap());
}

// ============================================================================
// Shape
// ============================================================================

#[test]
fn test_branching_selection_table() {
    assert_eq!(select_branching_factor(3), 3);
    assert_eq!(select_branching_factor(4), 3);
    assert_eq!(select_branching_factor(8), 8);
    assert_eq!(select_branching_factor(1), 2);
    assert_eq!(select_branching_factor(13), 13);
}

#[test]
fn test_level_factors_track_node_count() {
    let tree = PhiMerkleTree::build(numbered_leaves(30)).unwrap();
    // 30 -> k=21 -> 2 -> k=2 -> 1
    assert_eq!(tree.branching_factors(), &[21, 2]);

    let tree = PhiMerkleTree::build(numbered_leaves(1000)).unwrap();
    // 1000 -> k=55 -> 19 -> k=13 -> 2 -> k=2 -> 1
    assert_eq!(tree.branching_factors(), &[55, 13, 2]);
    for (i, &k) in tree.branching_factors().iter().enumerate() {
        assert_eq!(k, select_branching_factor(tree.levels()[i].len()));
    }
}

#[test]
fn test_coherence_boundary() {
    let sized = |len: usize| json!("x".repeat(len - 2));
    assert!(build_leaf(&sized(1000), &sized(618)).unwrap().1);
    assert!(!build_leaf(&sized(500), &sized(500)).unwrap().1);
}

#[test]
fn test_blake3_tree_proofs() {
    let config = PhiConfig::default().with_hash_algorithm(HashAlgorithm::Blake3);
    let tree = PhiMerkleTree::build_with(numbered_leaves(23), &config).unwrap();
    for i in 0..tree.len() {
        let proof = tree.prove(i).unwrap();
        assert!(proof
            .verify_with_config(&tree.leaves()[i], &tree.root(), &config)
            .unwrap());
    }
    assert_ne!(tree.root(), build_tree(&numbered_leaves(23)).unwrap());
}
