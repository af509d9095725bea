//! User Liability Verification
//!
//! Checks a user's liabilities document against the published audit root:
//!
//! 1. Both documents refer to the same audit.
//! 2. The partition roots hash to the published audit commitment.
//! 3. Every claimed leaf is re-derived from the user's credential and its
//!    inclusion proof replays to the partition root.
//!
//! The result is all-or-nothing: one bad entry invalidates the whole
//! document and no totals are returned. Rejection causes are logged but
//! not exposed to the caller.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::VerifierConfig;
use crate::core::decimal::{Decimal, DecimalError};
use crate::proof::commitment::{check_audit_commitment, CommitmentError, PartitionCommitment};
use crate::proof::document::{AuditRoot, UserLiabilities};
use crate::proof::inclusion::{check_proof, ProofError};
use crate::proof::node::{leaf_hash, NodeCommitment};
use crate::proof::nonce::NonceChain;

/// Verified liability per currency code.
pub type LiabilityTotals = BTreeMap<String, Decimal>;

/// Why a liabilities document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The documents belong to different audits.
    #[error("audit id mismatch: audit root {expected}, user liabilities {got}")]
    AuditIdMismatch {
        /// Id in the audit root.
        expected: String,
        /// Id in the user document.
        got: String,
    },
    /// Two partitions share an id.
    #[error("duplicate partition id {0}")]
    DuplicatePartition(String),
    /// Partition roots do not match the audit commitment.
    #[error(transparent)]
    Commitment(#[from] CommitmentError),
    /// An entry references a partition the audit does not have.
    #[error("unknown partition id {0}")]
    UnknownPartition(String),
    /// An entry's inclusion proof failed.
    #[error("proof for partition {partition_id} leaf {leaf_index}: {source}")]
    Proof {
        /// Partition of the entry.
        partition_id: String,
        /// Claimed leaf index.
        leaf_index: u64,
        /// Underlying proof failure.
        source: ProofError,
    },
    /// Totals overflowed the decimal context.
    #[error("liability totals: {0}")]
    Decimal(#[from] DecimalError),
}

/// Verifies user liabilities under a fixed configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Create a verifier.
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `user` against `audit` with the user's secret `credential`.
    ///
    /// Returns `(true, Some(totals))` when every entry verifies and
    /// `(false, None)` otherwise.
    pub fn validate_user_liabilities(
        &self,
        credential: &str,
        audit: &AuditRoot,
        user: &UserLiabilities,
    ) -> (bool, Option<LiabilityTotals>) {
        match self.try_validate(credential, audit, user) {
            Ok(totals) => (true, Some(totals)),
            Err(err) => {
                warn!(
                    audit_id = %audit.audit_id(),
                    user_id = %user.user_id,
                    error = %err,
                    "user liabilities rejected"
                );
                (false, None)
            }
        }
    }

    fn try_validate(
        &self,
        credential: &str,
        audit: &AuditRoot,
        user: &UserLiabilities,
    ) -> Result<LiabilityTotals, VerificationError> {
        let ctx = &self.config.decimal;

        if user.audit_id != audit.audit_id() {
            return Err(VerificationError::AuditIdMismatch {
                expected: audit.audit_id().to_owned(),
                got: user.audit_id.clone(),
            });
        }

        let mut partitions: BTreeMap<&str, &PartitionCommitment> = BTreeMap::new();
        for partition in audit.partitions() {
            if partitions.insert(&partition.id, partition).is_some() {
                return Err(VerificationError::DuplicatePartition(partition.id.clone()));
            }
        }

        check_audit_commitment(audit.partitions(), audit.commitment_digest(), ctx)?;
        debug!(partitions = partitions.len(), "audit commitment verified");

        let mut nonces = NonceChain::new(credential, &user.audit_id);
        let mut totals = LiabilityTotals::new();

        for entry in &user.liabilities {
            let partition = partitions
                .get(entry.audit_partition_id.as_str())
                .ok_or_else(|| {
                    VerificationError::UnknownPartition(entry.audit_partition_id.clone())
                })?;
            let leaf_index = entry.proof.leaf_index;

            let nonce = nonces.leaf_nonce(&partition.currency, leaf_index);
            let leaf = NodeCommitment {
                liability: entry.liability.clone(),
                digest: leaf_hash(&nonce, &user.user_id, &entry.liability, ctx),
            };

            let mut witnesses = Vec::with_capacity(entry.proof.witnesses.len() + 1);
            witnesses.extend_from_slice(&entry.proof.witnesses);
            witnesses.push(partition.commitment.clone());

            check_proof(&leaf, leaf_index, &witnesses, ctx).map_err(|source| {
                VerificationError::Proof {
                    partition_id: partition.id.clone(),
                    leaf_index,
                    source,
                }
            })?;
            debug!(
                partition_id = %partition.id,
                currency = %partition.currency,
                leaf_index,
                "liability entry verified"
            );

            let total = match totals.get(&partition.currency) {
                Some(sum) => ctx.add(sum, &entry.liability)?,
                None => entry.liability.clone(),
            };
            totals.insert(partition.currency.clone(), total);
        }

        Ok(totals)
    }
}

/// Verify `user` against `audit` with the default configuration.
pub fn validate_user_liabilities(
    credential: &str,
    audit: &AuditRoot,
    user: &UserLiabilities,
) -> (bool, Option<LiabilityTotals>) {
    Verifier::default().validate_user_liabilities(credential, audit, user)
}
