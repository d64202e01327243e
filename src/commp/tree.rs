// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Binary Merkle tree over 32-byte Fr32 leaves.
//!
//! Leaves beyond the end of the padded payload are zero. Instead of
//! materialising them, every level is completed with the root of an all-zero
//! subtree of matching height.

use multihash_derive::Hasher as _;
use rayon::prelude::*;

use crate::utils::commcid::Commitment;
use crate::utils::multihash::Sha2_256Trunc254Padded;

pub const NODE_SIZE: usize = 32;

/// Parent of two sibling nodes.
pub fn hash_pair(left: &Commitment, right: &Commitment) -> Commitment {
    let mut hasher = Sha2_256Trunc254Padded::default();
    hasher.update(left);
    hasher.update(right);
    let mut node = Commitment::default();
    node.copy_from_slice(hasher.finalize());
    node
}

/// Roots of all-zero subtrees, indexed by height.
pub fn zero_subtree_roots(depth: usize) -> Vec<Commitment> {
    let mut roots = Vec::with_capacity(depth + 1);
    let mut node = Commitment::default();
    roots.push(node);
    for _ in 0..depth {
        node = hash_pair(&node, &node);
        roots.push(node);
    }
    roots
}

/// Root of a tree of height `depth` whose leftmost leaves are `padded`.
///
/// `padded` must be a whole number of 32-byte nodes and hold at most
/// `2^depth` of them.
pub fn root(padded: &[u8], depth: usize) -> anyhow::Result<Commitment> {
    anyhow::ensure!(
        padded.len() % NODE_SIZE == 0,
        "padded payload of {} bytes is not a whole number of nodes",
        padded.len()
    );
    anyhow::ensure!(
        depth < usize::BITS as usize && padded.len() / NODE_SIZE <= 1 << depth,
        "{} leaves do not fit in a tree of height {depth}",
        padded.len() / NODE_SIZE
    );
    let zeros = zero_subtree_roots(depth);

    let mut layer: Vec<Commitment> = padded
        .par_chunks_exact(NODE_SIZE)
        .map(|chunk| {
            let mut leaf = Commitment::default();
            leaf.copy_from_slice(chunk);
            leaf
        })
        .collect();
    if layer.is_empty() {
        layer.push(zeros[0]);
    }

    for zero in &zeros[..depth] {
        if layer.len() % 2 == 1 {
            layer.push(*zero);
        }
        layer = layer
            .par_chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }

    match layer.as_slice() {
        [root] => Ok(*root),
        _ => anyhow::bail!("merkle reduction ended with {} nodes", layer.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Builds the full tree, zero leaves included.
    fn naive_root(padded: &[u8], depth: usize) -> Commitment {
        let mut leaves = padded.to_vec();
        leaves.resize(NODE_SIZE << depth, 0);
        let mut layer: Vec<Commitment> = leaves
            .chunks(NODE_SIZE)
            .map(|c| c.try_into().unwrap())
            .collect();
        while layer.len() > 1 {
            layer = layer.chunks(2).map(|p| hash_pair(&p[0], &p[1])).collect();
        }
        layer[0]
    }

    #[test]
    fn zero_subtree_of_height_one() {
        assert_eq!(
            hex::encode(zero_subtree_roots(1)[1]),
            "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb0b"
        );
    }

    #[test]
    fn height_zero_is_the_leaf() {
        let leaf = [7u8; 32];
        assert_eq!(root(&leaf, 0).unwrap(), leaf);
    }

    #[test]
    fn zero_padding_matches_full_tree() {
        let padded: Vec<u8> = (0..5 * NODE_SIZE).map(|i| (i % 251) as u8 & 0x3f).collect();
        for depth in 3..6 {
            assert_eq!(root(&padded, depth).unwrap(), naive_root(&padded, depth));
        }
    }

    #[test]
    fn empty_payload_is_the_zero_tree() {
        assert_eq!(root(&[], 4).unwrap(), zero_subtree_roots(4)[4]);
    }

    #[test]
    fn rejects_overfull_tree() {
        assert!(root(&[0; 3 * NODE_SIZE], 1).is_err());
        assert!(root(&[0; 33], 2).is_err());
    }
}
