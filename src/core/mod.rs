//! Core deterministic primitives.
//!
//! Everything hashed by the protocol goes through these types, so their
//! byte-level output must never drift between releases.

pub mod decimal;
pub mod hash;

// Re-export core types
pub use decimal::{Decimal, DecimalContext, DecimalError};
pub use hash::{encode_preimage, hash, kdf, Digest};
