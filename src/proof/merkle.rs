//! Merkle Sum Tree
//!
//! Array-backed complete binary tree over the leaf commitments of one
//! currency partition. Every node carries the sum of the liabilities below
//! it and a digest binding both children and their sums.
//!
//! ```text
//!                 [0] root
//!               /          \
//!           [1]              [2]
//!          /   \            /   \
//!       [3]     [4]      [5]     [6]
//!       / \     / \      / \     / \
//!     [7] [8] [9] [10] [11] [12] [13] [14]   <- leaves, input order
//! ```
//!
//! Children of `i` sit at `2i+1` and `2i+2`. Inclusion proofs locate a leaf
//! at `leafIndex + 2^depth - 1`, which only agrees with this layout when the
//! leaf count is a power of two, so the builder rejects any other count.

use thiserror::Error;
use tracing::debug;

use crate::core::decimal::{DecimalContext, DecimalError};
use crate::proof::node::{inner_hash, NodeCommitment};

/// Largest supported tree depth.
pub const MAX_TREE_DEPTH: u32 = 63;

/// Errors from building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No leaves were given.
    #[error("cannot build a tree without leaves")]
    EmptyTree,
    /// Leaf count is not a power of two; pad before building.
    #[error("leaf count {0} is not a power of two")]
    NotPowerOfTwo(usize),
    /// A node sum does not fit the decimal context.
    #[error("node liability: {0}")]
    Decimal(#[from] DecimalError),
}

/// Shape of a tree that proofs can be checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeShape {
    /// Complete tree with `2^depth` leaves.
    PowerOfTwo(u32),
}

impl TreeShape {
    /// Shape for `leaf_count` leaves.
    pub fn from_leaf_count(leaf_count: usize) -> Result<Self, TreeError> {
        if leaf_count == 0 {
            return Err(TreeError::EmptyTree);
        }
        if !leaf_count.is_power_of_two() {
            return Err(TreeError::NotPowerOfTwo(leaf_count));
        }
        Ok(Self::PowerOfTwo(leaf_count.trailing_zeros()))
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> u32 {
        match self {
            Self::PowerOfTwo(depth) => *depth,
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        1usize << self.depth()
    }

    /// Number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        2 * self.leaf_count() - 1
    }
}

/// A fully built Merkle sum tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    nodes: Vec<NodeCommitment>,
    shape: TreeShape,
}

impl MerkleTree {
    /// Build the tree bottom-up from ordered leaf commitments.
    pub fn build(leaves: Vec<NodeCommitment>, ctx: &DecimalContext) -> Result<Self, TreeError> {
        let shape = TreeShape::from_leaf_count(leaves.len())?;
        let n = leaves.len();

        let mut nodes = vec![NodeCommitment::default(); n - 1];
        nodes.extend(leaves);

        for i in (0..n - 1).rev() {
            let left = &nodes[2 * i + 1];
            let right = &nodes[2 * i + 2];

            let liability = ctx.add(&left.liability, &right.liability)?;
            let digest = inner_hash(
                &left.liability,
                &right.liability,
                &left.digest,
                &right.digest,
                ctx,
            );

            nodes[i] = NodeCommitment { liability, digest };
        }

        debug!(leaves = n, depth = shape.depth(), "built merkle tree");

        Ok(Self { nodes, shape })
    }

    /// The root commitment.
    pub fn root(&self) -> &NodeCommitment {
        &self.nodes[0]
    }

    /// All nodes in heap order, root first.
    pub fn nodes(&self) -> &[NodeCommitment] {
        &self.nodes
    }

    /// The leaves, in input order.
    pub fn leaves(&self) -> &[NodeCommitment] {
        &self.nodes[self.shape.leaf_count() - 1..]
    }

    /// Shape of the tree.
    pub fn shape(&self) -> TreeShape {
        self.shape
    }

    /// Depth of the tree.
    pub fn depth(&self) -> u32 {
        self.shape.depth()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.shape.leaf_count()
    }

    /// Sibling path from the leaf level up to, but excluding, the root.
    ///
    /// Returns None if `leaf_index` is out of range.
    pub fn witnesses(&self, leaf_index: usize) -> Option<Vec<NodeCommitment>> {
        if leaf_index >= self.leaf_count() {
            return None;
        }

        let mut witnesses = Vec::with_capacity(self.depth() as usize);
        let mut idx = leaf_index + self.leaf_count() - 1;

        while idx > 0 {
            let sibling = if idx % 2 == 1 { idx + 1 } else { idx - 1 };
            witnesses.push(self.nodes[sibling].clone());
            idx = (idx - 1) / 2;
        }

        Some(witnesses)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::decimal::Decimal;

    fn node(liability: &str, digest: &str) -> NodeCommitment {
        NodeCommitment::new(liability.parse::<Decimal>().unwrap(), digest)
    }

    /// Eight leaves with digests published alongside their tree.
    pub(crate) fn example_leaves() -> Vec<NodeCommitment> {
        vec![
            node("2.542", "876c9e7f5222d843ab1b4c00b4d856ad9cfa222e28a2e5792da8b28992a3ff8d"),
            node("5.2224723", "4e16ff8cda628474156680c4640fce27093a1a012bd588020f1d47c3ddc7e80c"),
            node("7.45", "a5f2a333f391626b31567972d3b91c8079016f93c0590c47f39e68da0d21f670"),
            node("248.3452", "0b727574d0d3bb35fa6de5433bb4993e14abba3daf45ec737ab00b9d7bf51f13"),
            node("375.34534", "8aa9aa3718f2e89833fe21d2948786c5982600a3f6e3945a2f2624d4ae577869"),
            node("2.34534", "54e0ac1f0a1596cfbba2cacb95ea6d159f66abcb6fee488e13d9bf22f116e3ec"),
            node("6.9524", "8ae884c6678476a8b4be466920c94842d5a458895c028796644f0b582554cb17"),
            node("2.103", "9020c9622c0328d7094f4b249f04c8fe6ed1e17caddced104305e680493957ea"),
        ]
    }

    #[test]
    fn test_example_tree() {
        let tree = MerkleTree::build(example_leaves(), &DecimalContext::default()).unwrap();

        let expected_internal = [
            node("650.3057523", "250c240f6478ca71dcc623753efbbb5952514a225323d7c7153c87424aa18f74"),
            node("263.5596723", "343d351892e5049ae79b84fb1210d05ea44d3d0b69990ffbe598e634fa0f41fc"),
            node("386.74608", "5471bbed700db2385e03a18302d456547fd8e2220b2ddcc882c456a6ae8c68f8"),
            node("7.7644723", "77933b1f697622b5660c7be3fe52fb253aca11a9568fc4735fa73fc294fb5585"),
            node("255.7952", "6d5013bdd8364d12fe83ff228c72f528b124cc507bcbeebf3fedf5907dda530b"),
            node("377.69068", "b97a1c1bb1bc42351d53702e0801e27dc712ad1e265d3bee8e048e73c03d3494"),
            node("9.0554", "bc17b9eb4ebf84a8b73a555f2a334da4b753ae0fce6485bb602de7f5551f3d41"),
        ];

        assert_eq!(tree.nodes().len(), 15);
        assert_eq!(&tree.nodes()[..7], &expected_internal[..]);
        assert_eq!(tree.leaves(), &example_leaves()[..]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_example_witnesses() {
        let tree = MerkleTree::build(example_leaves(), &DecimalContext::default()).unwrap();
        let witnesses = tree.witnesses(4).unwrap();

        assert_eq!(
            witnesses,
            vec![
                node("2.34534", "54e0ac1f0a1596cfbba2cacb95ea6d159f66abcb6fee488e13d9bf22f116e3ec"),
                node("9.0554", "bc17b9eb4ebf84a8b73a555f2a334da4b753ae0fce6485bb602de7f5551f3d41"),
                node("263.5596723", "343d351892e5049ae79b84fb1210d05ea44d3d0b69990ffbe598e634fa0f41fc"),
            ]
        );
        assert!(tree.witnesses(8).is_none());
    }

    #[test]
    fn test_rejects_bad_leaf_counts() {
        let ctx = DecimalContext::default();
        assert_eq!(MerkleTree::build(vec![], &ctx), Err(TreeError::EmptyTree));

        let mut leaves = example_leaves();
        leaves.truncate(6);
        assert_eq!(MerkleTree::build(leaves, &ctx), Err(TreeError::NotPowerOfTwo(6)));

        let mut leaves = example_leaves();
        leaves.truncate(3);
        assert_eq!(MerkleTree::build(leaves, &ctx), Err(TreeError::NotPowerOfTwo(3)));
    }

    #[test]
    fn test_single_leaf_tree() {
        let leaf = node("1", "ab");
        let tree = MerkleTree::build(vec![leaf.clone()], &DecimalContext::default()).unwrap();
        assert_eq!(tree.root(), &leaf);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.witnesses(0), Some(vec![]));
    }

    #[test]
    fn test_tree_shape() {
        assert_eq!(TreeShape::from_leaf_count(1), Ok(TreeShape::PowerOfTwo(0)));
        assert_eq!(TreeShape::from_leaf_count(16), Ok(TreeShape::PowerOfTwo(4)));
        let shape = TreeShape::PowerOfTwo(3);
        assert_eq!(shape.leaf_count(), 8);
        assert_eq!(shape.node_count(), 15);
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let ctx = DecimalContext {
            precision: 3,
            ..DecimalContext::default()
        };
        let leaves = vec![node("999", "aa"), node("1.5", "bb")];
        assert!(matches!(
            MerkleTree::build(leaves, &ctx),
            Err(TreeError::Decimal(DecimalError::PrecisionExceeded { .. }))
        ));
    }
}
