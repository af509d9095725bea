//! # SB PoL Verifier
//!
//! Client-side verification of proof-of-liabilities audits. A user checks
//! that the exchange's published audit includes their balances, without
//! trusting the exchange and without seeing any other user's data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SB POL VERIFIER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── hash.rs     - SHA-256, HMAC-SHA-256, pre-image encoding │
//! │  └── decimal.rs  - Exact decimal liabilities                 │
//! │                                                              │
//! │  proof/          - Verification engine                       │
//! │  ├── nonce.rs    - Nonce derivation chain                    │
//! │  ├── node.rs     - Leaf / inner commitments                  │
//! │  ├── merkle.rs   - Merkle sum tree builder                   │
//! │  ├── inclusion.rs- Inclusion proof validation                │
//! │  ├── commitment.rs- Audit commitment                         │
//! │  ├── document.rs - Input documents                           │
//! │  └── verify.rs   - User liabilities orchestration            │
//! │                                                              │
//! │  config.rs       - Decimal context configuration             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Every operation is a pure function of its inputs:
//! - No floating-point arithmetic on liabilities
//! - No global precision settings (see [`DecimalContext`])
//! - BTreeMap wherever iteration order reaches output
//!
//! Digests therefore match those the exchange published, on any platform.
//!
//! ## Example
//!
//! ```
//! use sb_pol::{validate_user_liabilities, AuditRoot, UserLiabilities};
//!
//! fn check(credential: &str, audit: &AuditRoot, user: &UserLiabilities) {
//!     let (valid, totals) = validate_user_liabilities(credential, audit, user);
//!     if valid {
//!         for (currency, amount) in totals.unwrap_or_default() {
//!             println!("{currency}: {amount}");
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod proof;

// Re-export commonly used types
pub use crate::config::{ConfigError, VerifierConfig};
pub use crate::core::decimal::{Decimal, DecimalContext, DecimalError};
pub use crate::core::hash::Digest;
pub use proof::{
    aud_comm_hash_check, full_leaf_hash_derive, validate_proof, validate_user_liabilities,
    AuditRoot, LiabilityTotals, MerkleTree, NodeCommitment, PartitionCommitment, TreeShape,
    UserLiabilities, Verifier,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
