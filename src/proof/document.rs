//! Audit Documents
//!
//! The two JSON documents a verification consumes: the audit root published
//! by the exchange, and the liabilities issued to a single user. Field names
//! follow the exchange's wire format.

use serde::{Deserialize, Serialize};

use crate::core::decimal::Decimal;
use crate::core::hash::Digest;
use crate::proof::commitment::PartitionCommitment;
use crate::proof::node::NodeCommitment;

/// Published audit root document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRoot {
    /// The audit itself.
    pub audit: Audit,
}

impl AuditRoot {
    /// Audit identifier.
    pub fn audit_id(&self) -> &str {
        &self.audit.id
    }

    /// Currency partition roots.
    pub fn partitions(&self) -> &[PartitionCommitment] {
        &self.audit.partitions
    }

    /// Published audit commitment digest.
    pub fn commitment_digest(&self) -> &Digest {
        &self.audit.commitment.digest
    }
}

/// Audit-level data: id, partition roots and their combined commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Audit identifier.
    pub id: String,
    /// Snapshot time as published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Commitment over all partition roots.
    pub commitment: AuditCommitment,
    /// One partition per currency tree.
    pub partitions: Vec<PartitionCommitment>,
}

/// Audit commitment digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCommitment {
    /// Digest over the sorted partition roots.
    pub digest: Digest,
}

/// Liabilities issued to one user for one audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLiabilities {
    /// User identifier hashed into every leaf.
    pub user_id: String,
    /// Audit the liabilities belong to.
    pub audit_id: String,
    /// One entry per leaf owned by the user.
    pub liabilities: Vec<LiabilityEntry>,
}

/// A single claimed leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityEntry {
    /// Partition the leaf lives in.
    pub audit_partition_id: String,
    /// Claimed liability.
    pub liability: Decimal,
    /// Inclusion proof of the leaf.
    pub proof: LiabilityProof,
}

/// Inclusion proof as issued by the exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityProof {
    /// Zero-based leaf position.
    pub leaf_index: u64,
    /// Leaf nonce as computed by the exchange. Informational only; the
    /// verifier derives its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Sibling path from the leaf level, root excluded.
    pub witnesses: Vec<NodeCommitment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audit_root() {
        let json = r#"{
            "audit": {
                "id": "SBPOL20230113",
                "time": "2023-01-13T00:00:00Z",
                "commitment": { "digest": "abcd" },
                "partitions": [
                    {
                        "id": "p1",
                        "currency": "BTC",
                        "commitment": { "liability": "12.5", "digest": "ef01" }
                    }
                ]
            }
        }"#;

        let root: AuditRoot = serde_json::from_str(json).unwrap();
        assert_eq!(root.audit_id(), "SBPOL20230113");
        assert_eq!(root.commitment_digest().as_str(), "abcd");
        assert_eq!(root.partitions()[0].currency, "BTC");
        assert_eq!(
            root.partitions()[0].commitment.liability,
            "12.5".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_parse_user_liabilities() {
        let json = r#"{
            "user_id": "u-1",
            "audit_id": "SBPOL20230113",
            "liabilities": [
                {
                    "audit_partition_id": "p1",
                    "liability": "1.2",
                    "proof": {
                        "leaf_index": 5,
                        "nonce": "ff",
                        "witnesses": [ { "liability": 3, "digest": "aa" } ]
                    }
                }
            ],
            "extra": "ignored"
        }"#;

        let user: UserLiabilities = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, "u-1");
        let entry = &user.liabilities[0];
        assert_eq!(entry.proof.leaf_index, 5);
        assert_eq!(entry.proof.nonce.as_deref(), Some("ff"));
        assert_eq!(entry.proof.witnesses[0].liability, Decimal::from(3u64));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let json = r#"{ "audit_partition_id": "p", "liability": "1",
                        "proof": { "leaf_index": 0, "witnesses": [] } }"#;
        let entry: LiabilityEntry = serde_json::from_str(json).unwrap();
        assert!(entry.proof.nonce.is_none());
    }

    #[test]
    fn test_negative_leaf_index_rejected() {
        let json = r#"{ "leaf_index": -1, "witnesses": [] }"#;
        assert!(serde_json::from_str::<LiabilityProof>(json).is_err());
    }
}
