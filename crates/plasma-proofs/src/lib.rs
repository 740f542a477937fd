//! # plasma-proofs
//!
//! Proof primitives consumed by the exit game: transaction decoding,
//! merkle membership, and signature recovery.
//!
//! ## Architecture
//!
//! The exit game never touches bytes or curves directly. It calls:
//! 1. **TransactionDecoder**: raw bytes → fixed 17-field transaction
//! 2. **ProofVerifier**: merkle membership, input/confirmation signature
//!    checks, and signer recovery
//!
//! Both are traits; [`JsonTransactionDecoder`] and [`Sha256Verifier`] are
//! the defaults (SHA-256 merkle trees of depth 16, recoverable ed25519).

pub mod decoder;
pub mod hashing;
pub mod merkle;
pub mod signature;
pub mod verifier;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;

pub use decoder::{JsonTransactionDecoder, TransactionDecoder};
pub use hashing::{confirmation_hash, merkle_hash, tx_hash};
pub use merkle::{check_membership, MerkleTree};
pub use verifier::{ProofVerifier, Sha256Verifier};

#[cfg(any(test, feature = "test-helpers"))]
pub use signature::TestSigner;
