//! Inclusion Proof Validation
//!
//! Replays a leaf up to its partition root using the sibling witnesses,
//! recomputing both the digest and the liability sum at every level.
//! The last witness is the root commitment itself.
//!
//! Every sibling must carry a strictly positive liability. Without that, a
//! node could under-report its total while a "phantom" negative sibling
//! compensates, and the sums would still add up to the published root.

use thiserror::Error;
use tracing::debug;

use crate::core::decimal::{Decimal, DecimalContext, DecimalError};
use crate::core::hash::Digest;
use crate::proof::merkle::MAX_TREE_DEPTH;
use crate::proof::node::{inner_hash, NodeCommitment};

/// Why a proof was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// Fewer than one witness level plus the root.
    #[error("proof has {0} witnesses, at least 2 are required")]
    TooFewWitnesses(usize),
    /// Proof is deeper than any supported tree.
    #[error("proof depth {0} exceeds the maximum tree depth")]
    TooDeep(usize),
    /// Leaf index does not fit a tree of the proof's depth.
    #[error("leaf index {index} out of range for depth {depth}")]
    LeafIndexOutOfRange {
        /// Claimed leaf index.
        index: u64,
        /// Depth implied by the witnesses.
        depth: usize,
    },
    /// The leaf liability is zero or negative.
    #[error("leaf liability is not positive")]
    NonPositiveLeaf,
    /// A witness liability is zero or negative.
    #[error("witness {0} liability is not positive")]
    NonPositiveWitness(usize),
    /// Summing up the path overflowed the decimal context.
    #[error("path liability: {0}")]
    Decimal(#[from] DecimalError),
    /// Recomputed root sum differs from the provided root.
    #[error("root liability mismatch: computed {computed}, provided {provided}")]
    LiabilityMismatch {
        /// Sum accumulated along the path.
        computed: Decimal,
        /// Liability of the provided root.
        provided: Decimal,
    },
    /// Recomputed root digest differs from the provided root.
    #[error("root digest mismatch: computed {computed}, provided {provided}")]
    DigestMismatch {
        /// Digest recomputed along the path.
        computed: Digest,
        /// Digest of the provided root.
        provided: Digest,
    },
}

/// Check an inclusion proof, reporting why it failed.
///
/// `witnesses` runs from the leaf's sibling up to and including the root.
pub fn check_proof(
    leaf: &NodeCommitment,
    leaf_index: u64,
    witnesses: &[NodeCommitment],
    ctx: &DecimalContext,
) -> Result<(), ProofError> {
    let (root, path) = match witnesses.split_last() {
        Some((root, path)) if !path.is_empty() => (root, path),
        _ => return Err(ProofError::TooFewWitnesses(witnesses.len())),
    };

    let depth = path.len();
    if depth > MAX_TREE_DEPTH as usize {
        return Err(ProofError::TooDeep(depth));
    }

    if !leaf.liability.is_positive() {
        return Err(ProofError::NonPositiveLeaf);
    }

    let width = 1u64 << depth;
    if leaf_index >= width {
        return Err(ProofError::LeafIndexOutOfRange {
            index: leaf_index,
            depth,
        });
    }

    // Heap position of the leaf; fits in u64 since depth <= 63.
    let mut idx = leaf_index + (width - 1);
    let mut liability = leaf.liability.clone();
    let mut digest = leaf.digest.clone();

    for (i, witness) in path.iter().enumerate() {
        if !witness.liability.is_positive() {
            return Err(ProofError::NonPositiveWitness(i));
        }

        digest = if idx % 2 == 1 {
            inner_hash(&liability, &witness.liability, &digest, &witness.digest, ctx)
        } else {
            inner_hash(&witness.liability, &liability, &witness.digest, &digest, ctx)
        };

        liability = ctx.add(&liability, &witness.liability)?;
        idx = (idx - 1) / 2;
    }

    if liability != root.liability {
        return Err(ProofError::LiabilityMismatch {
            computed: liability,
            provided: root.liability.clone(),
        });
    }

    if digest != root.digest {
        return Err(ProofError::DigestMismatch {
            computed: digest,
            provided: root.digest.clone(),
        });
    }

    Ok(())
}

/// Boolean form of [`check_proof`].
pub fn validate_proof(
    leaf: &NodeCommitment,
    leaf_index: u64,
    witnesses: &[NodeCommitment],
    ctx: &DecimalContext,
) -> bool {
    match check_proof(leaf, leaf_index, witnesses, ctx) {
        Ok(()) => true,
        Err(err) => {
            debug!(leaf_index, error = %err, "inclusion proof rejected");
            false
        }
    }
}
