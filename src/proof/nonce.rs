//! Nonce Derivation Chain
//!
//! Binds a user's secret credential to one audit, one currency tree and one
//! leaf position:
//!
//! ```text
//! credential ──kdf──▶ audit nonce ──kdf──▶ tree nonce ──kdf──▶ leaf nonce
//!             auditId              currency            leafIndex
//! ```
//!
//! Without the credential, nonces for different audits, currencies or
//! positions cannot be linked. With it, the user reproduces exactly the
//! nonce the exchange used for their leaf.

use std::collections::BTreeMap;

use crate::core::hash::{kdf_parts, Digest};

/// Label for the audit nonce step.
pub const AUDIT_NONCE_LABEL: &str = "SB PoL - Audit nonce derivation";

/// Label for the per-currency tree nonce step.
pub const TREE_NONCE_LABEL: &str = "SB PoL - Currency Merkle tree nonce derivation";

/// Label for the leaf nonce step.
pub const LEAF_NONCE_LABEL: &str = "SB PoL - Leaf nonce derivation";

/// Derive the audit nonce from the user's credential.
pub fn audit_nonce(credential: &str, audit_id: &str) -> Digest {
    kdf_parts(credential, &[AUDIT_NONCE_LABEL, audit_id])
}

/// Derive the nonce of one currency's Merkle tree.
pub fn tree_nonce(audit_nonce: &Digest, currency: &str) -> Digest {
    kdf_parts(audit_nonce.as_str(), &[TREE_NONCE_LABEL, currency])
}

/// Derive the nonce of the leaf at `leaf_index`.
pub fn leaf_nonce(tree_nonce: &Digest, leaf_index: u64) -> Digest {
    kdf_parts(tree_nonce.as_str(), &[LEAF_NONCE_LABEL, &leaf_index.to_string()])
}

/// Nonce chain bound to one credential and audit.
///
/// Caches the per-currency tree nonces, so a user holding many leaves in the
/// same currency pays for the first two steps once.
#[derive(Debug)]
pub struct NonceChain {
    audit_nonce: Digest,
    tree_nonces: BTreeMap<String, Digest>,
}

impl NonceChain {
    /// Start a chain for `credential` within `audit_id`.
    pub fn new(credential: &str, audit_id: &str) -> Self {
        Self {
            audit_nonce: audit_nonce(credential, audit_id),
            tree_nonces: BTreeMap::new(),
        }
    }

    /// The audit-level nonce.
    pub fn audit_nonce(&self) -> &Digest {
        &self.audit_nonce
    }

    /// Tree nonce for `currency`, derived on first use.
    pub fn tree_nonce(&mut self, currency: &str) -> &Digest {
        let audit_nonce = &self.audit_nonce;
        self.tree_nonces
            .entry(currency.to_owned())
            .or_insert_with(|| tree_nonce(audit_nonce, currency))
    }

    /// Leaf nonce for `(currency, leaf_index)`.
    pub fn leaf_nonce(&mut self, currency: &str, leaf_index: u64) -> Digest {
        leaf_nonce(self.tree_nonce(currency), leaf_index)
    }
}
