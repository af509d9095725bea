//! Audit Commitment
//!
//! One digest over every currency partition root of an audit. The exchange
//! publishes it; the verifier recomputes it from the published partitions.
//!
//! Partitions are hashed in a canonical order (currency code compared
//! case-insensitively, then partition id) so the digest does not depend on
//! how the partitions happen to be serialized.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::decimal::DecimalContext;
use crate::core::hash::{hash_parts, Digest};
use crate::proof::node::NodeCommitment;

/// Leading label of the audit commitment pre-image.
pub const AUDIT_COMMITMENT_LABEL: &str = "SB PoL - Audit commitment hash";

/// Root commitment of one currency's Merkle tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCommitment {
    /// Partition id, unique within an audit.
    pub id: String,
    /// Currency code of the tree.
    pub currency: String,
    /// Root of the tree.
    pub commitment: NodeCommitment,
}

/// Audit commitment verification errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    /// Recomputed digest differs from the published one.
    #[error("audit commitment mismatch: published {expected}, computed {computed}")]
    DigestMismatch {
        /// Published digest.
        expected: Digest,
        /// Recomputed digest.
        computed: Digest,
    },
}

/// Compute the audit commitment digest over `partitions`.
pub fn compute_audit_commitment(
    partitions: &[PartitionCommitment],
    ctx: &DecimalContext,
) -> Digest {
    let mut sorted: Vec<&PartitionCommitment> = partitions.iter().collect();
    sorted.sort_by_cached_key(|p| (p.currency.to_uppercase(), p.id.clone()));

    let liabilities: Vec<String> = sorted
        .iter()
        .map(|p| ctx.to_canonical_string(&p.commitment.liability))
        .collect();

    let mut parts: Vec<&str> = Vec::with_capacity(1 + 3 * sorted.len());
    parts.push(AUDIT_COMMITMENT_LABEL);
    for (partition, liability) in sorted.iter().zip(&liabilities) {
        parts.push(&partition.id);
        parts.push(liability);
        parts.push(partition.commitment.digest.as_str());
    }

    hash_parts(&parts)
}

/// Check `partitions` against the published digest.
pub fn check_audit_commitment(
    partitions: &[PartitionCommitment],
    published: &Digest,
    ctx: &DecimalContext,
) -> Result<(), CommitmentError> {
    let computed = compute_audit_commitment(partitions, ctx);
    if &computed != published {
        return Err(CommitmentError::DigestMismatch {
            expected: published.clone(),
            computed,
        });
    }
    Ok(())
}

/// Boolean form of [`check_audit_commitment`].
pub fn aud_comm_hash_check(
    partitions: &[PartitionCommitment],
    published: &Digest,
    ctx: &DecimalContext,
) -> bool {
    match check_audit_commitment(partitions, published, ctx) {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "audit commitment rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decimal::Decimal;
    use crate::core::hash::hash;
    use proptest::prelude::*;

    fn partition(id: &str, currency: &str, liability: &str, digest: &str) -> PartitionCommitment {
        PartitionCommitment {
            id: id.to_owned(),
            currency: currency.to_owned(),
            commitment: NodeCommitment::new(liability.parse::<Decimal>().unwrap(), digest),
        }
    }

    fn sample() -> Vec<PartitionCommitment> {
        vec![
            partition("p-usdc", "USDC", "99.70291", "d1"),
            partition("p-btc", "BTC", "1.50", "d2"),
            partition("p-chsb", "chsb", "20022", "d3"),
            partition("p-eth", "ETH", "1.700273775267302", "d4"),
        ]
    }

    #[test]
    fn test_preimage_layout() {
        let ctx = DecimalContext::default();
        let expected = hash(
            b"SB PoL - Audit commitment hash,p-btc,1.5,d2,p-chsb,20022,d3,p-eth,1.700273775267302,d4,p-usdc,99.70291,d1",
        );
        assert_eq!(compute_audit_commitment(&sample(), &ctx), expected);
    }

    #[test]
    fn test_matching_digest_passes() {
        let ctx = DecimalContext::default();
        let digest = compute_audit_commitment(&sample(), &ctx);
        assert!(aud_comm_hash_check(&sample(), &digest, &ctx));
    }

    #[test]
    fn test_bad_digest_fails() {
        let ctx = DecimalContext::default();
        assert!(!aud_comm_hash_check(&sample(), &Digest::new("badCommitmentDigest"), &ctx));
        assert!(matches!(
            check_audit_commitment(
                &sample(),
                &Digest::new("017a68ca267d6369f24fb749151c143b43c775451e794e0a287887ad31dbb8d2"),
                &ctx
            ),
            Err(CommitmentError::DigestMismatch { .. })
        ));
    }

    #[test]
    fn test_partition_change_fails() {
        let ctx = DecimalContext::default();
        let digest = compute_audit_commitment(&sample(), &ctx);

        let mut changed = sample();
        changed[0].commitment.liability = "99.70292".parse().unwrap();
        assert!(!aud_comm_hash_check(&changed, &digest, &ctx));

        let mut changed = sample();
        changed[2].id = "p-other".to_owned();
        assert!(!aud_comm_hash_check(&changed, &digest, &ctx));
    }

    #[test]
    fn test_same_currency_orders_by_partition_id() {
        let ctx = DecimalContext::default();
        let expected = hash(
            b"SB PoL - Audit commitment hash,p-btc-cold,2,d5,p-btc-hot,1.5,d2,p-eth,3,d4",
        );
        let forward = vec![
            partition("p-btc-cold", "BTC", "2", "d5"),
            partition("p-btc-hot", "btc", "1.5", "d2"),
            partition("p-eth", "ETH", "3", "d4"),
        ];
        let reversed: Vec<PartitionCommitment> = forward.iter().rev().cloned().collect();

        assert_eq!(compute_audit_commitment(&forward, &ctx), expected);
        assert_eq!(compute_audit_commitment(&reversed, &ctx), expected);
    }

    #[test]
    fn test_empty_audit() {
        let ctx = DecimalContext::default();
        assert_eq!(
            compute_audit_commitment(&[], &ctx),
            hash(b"SB PoL - Audit commitment hash")
        );
    }

    proptest! {
        #[test]
        fn prop_order_independent(order in Just((0..4).collect::<Vec<usize>>()).prop_shuffle()) {
            let ctx = DecimalContext::default();
            let base = sample();
            let digest = compute_audit_commitment(&base, &ctx);

            let shuffled: Vec<PartitionCommitment> = order.iter().map(|&i| base[i].clone()).collect();
            prop_assert!(aud_comm_hash_check(&shuffled, &digest, &ctx));
        }
    }
}
