//! Proof of Liabilities Verification
//!
//! Lets a user check that an audit includes their balances, using only the
//! published audit root, their issued proofs and their secret credential.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  nonce.rs       - Credential → audit → tree → leaf nonces   │
//! │  node.rs        - Leaf and inner node hashes                │
//! │  merkle.rs      - Array-backed Merkle sum tree              │
//! │  inclusion.rs   - Inclusion proof replay                    │
//! │  commitment.rs  - Audit commitment over partition roots     │
//! │  document.rs    - Audit root / user liabilities documents   │
//! │  verify.rs      - End-to-end user verification             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod commitment;
pub mod document;
pub mod inclusion;
pub mod merkle;
pub mod node;
pub mod nonce;
pub mod verify;

// Re-export key types
pub use commitment::{
    aud_comm_hash_check, check_audit_commitment, compute_audit_commitment, CommitmentError,
    PartitionCommitment,
};
pub use document::{
    Audit, AuditCommitment, AuditRoot, LiabilityEntry, LiabilityProof, UserLiabilities,
};
pub use inclusion::{check_proof, validate_proof, ProofError};
pub use merkle::{MerkleTree, TreeError, TreeShape};
pub use node::{full_leaf_hash_derive, inner_hash, leaf_hash, NodeCommitment};
pub use nonce::NonceChain;
pub use verify::{validate_user_liabilities, LiabilityTotals, VerificationError, Verifier};
