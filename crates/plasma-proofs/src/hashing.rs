//! Canonical SHA-256 digests over child transactions.
//!
//! ```text
//! tx_hash           = SHA-256(tx_bytes)
//! merkle_hash       = SHA-256(tx_hash ‖ input_sig_0 ‖ input_sig_1)
//! confirmation_hash = SHA-256(merkle_hash ‖ block_root)
//! ```
//!
//! `merkle_hash` is the leaf committed in the child block; the confirmation
//! hash binds an owner's acknowledgment to one specific committed block.

use plasma_types::{Hash32, TxSignatures};
use sha2::{Digest, Sha256};

/// Hash of the raw transaction bytes.
#[must_use]
pub fn tx_hash(tx_bytes: &[u8]) -> Hash32 {
    Sha256::digest(tx_bytes).into()
}

/// Merkle leaf for a transaction: its hash bound to its input signatures.
#[must_use]
pub fn merkle_hash(tx_hash: &Hash32, sigs: &TxSignatures) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(tx_hash);
    hasher.update(sigs.input_bytes());
    hasher.finalize().into()
}

/// The message an owner signs to confirm a transaction in a given block.
#[must_use]
pub fn confirmation_hash(merkle_hash: &Hash32, root: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(merkle_hash);
    hasher.update(root);
    hasher.finalize().into()
}
