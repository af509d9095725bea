//! Leaf and Inner Node Commitments
//!
//! ```text
//! leaf  = H("leaf",  leafNonce, userId, liability)
//! inner = H("inner", leftLiability, rightLiability, leftDigest, rightDigest)
//! ```
//!
//! Components are comma-joined and liabilities use the canonical decimal
//! string. Left/right order is part of the pre-image, so swapping children
//! changes the parent digest.

use serde::{Deserialize, Serialize};

use crate::core::decimal::{Decimal, DecimalContext};
use crate::core::hash::{hash_parts, Digest};
use crate::proof::nonce::NonceChain;

/// Domain tag for leaf pre-images.
pub const LEAF_TAG: &str = "leaf";

/// Domain tag for inner node pre-images.
pub const INNER_TAG: &str = "inner";

/// Public commitment to a leaf or an internal node.
///
/// `liability` is the total under the node, `digest` binds it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCommitment {
    /// Cumulative liability below this node.
    pub liability: Decimal,
    /// Hash binding the node.
    pub digest: Digest,
}

impl NodeCommitment {
    /// Create a commitment.
    pub fn new(liability: Decimal, digest: impl Into<Digest>) -> Self {
        Self {
            liability,
            digest: digest.into(),
        }
    }
}

/// Hash of a leaf from its already-derived nonce.
pub fn leaf_hash(
    leaf_nonce: &Digest,
    user_id: &str,
    liability: &Decimal,
    ctx: &DecimalContext,
) -> Digest {
    let liability = ctx.to_canonical_string(liability);
    hash_parts(&[LEAF_TAG, leaf_nonce.as_str(), user_id, &liability])
}

/// Hash of an inner node from its two children.
pub fn inner_hash(
    left_liability: &Decimal,
    right_liability: &Decimal,
    left_digest: &Digest,
    right_digest: &Digest,
    ctx: &DecimalContext,
) -> Digest {
    let left = ctx.to_canonical_string(left_liability);
    let right = ctx.to_canonical_string(right_liability);
    hash_parts(&[
        INNER_TAG,
        &left,
        &right,
        left_digest.as_str(),
        right_digest.as_str(),
    ])
}

/// Reproduce a user's leaf digest from first principles.
///
/// Runs the whole nonce chain, then [`leaf_hash`].
pub fn full_leaf_hash_derive(
    credential: &str,
    audit_id: &str,
    currency: &str,
    leaf_index: u64,
    user_id: &str,
    liability: &Decimal,
    ctx: &DecimalContext,
) -> Digest {
    let mut chain = NonceChain::new(credential, audit_id);
    let nonce = chain.leaf_nonce(currency, leaf_index);
    leaf_hash(&nonce, user_id, liability, ctx)
}
