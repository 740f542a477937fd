//! Recoverable ed25519 signatures.
//!
//! ed25519 has no public-key recovery, so a [`Signature`] carries the
//! signer's verifying key in front of the 64-byte signature. Recovery
//! verifies the signature under that key and, only if it holds, returns the
//! address derived from the key.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use plasma_types::{Address, Hash32, Signature};

/// Sign a 32-byte digest.
#[must_use]
pub fn sign(key: &SigningKey, hash: &Hash32) -> Signature {
    let sig = key.sign(hash);
    Signature::from_parts(key.verifying_key().as_bytes(), &sig.to_bytes())
}

/// Recover the signer's address, or `None` if the signature is empty,
/// carries an invalid key, or does not verify over `hash`.
#[must_use]
pub fn recover(hash: &Hash32, signature: &Signature) -> Option<Address> {
    if signature.is_empty() {
        return None;
    }
    let pubkey = signature.pubkey();
    let key = VerifyingKey::from_bytes(&pubkey).ok()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.signature_bytes());
    key.verify_strict(hash, &sig).ok()?;
    Some(Address::from_pubkey(&pubkey))
}

/// Deterministic signer for fixtures. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Clone)]
pub struct TestSigner {
    key: SigningKey,
}

#[cfg(any(test, feature = "test-helpers"))]
impl TestSigner {
    /// A signer whose secret key is 32 copies of `seed`.
    #[must_use]
    pub fn from_seed(seed: u8) -> Self {
        Self {
            key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_pubkey(self.key.verifying_key().as_bytes())
    }

    #[must_use]
    pub fn sign(&self, hash: &Hash32) -> Signature {
        sign(&self.key, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recover_returns_signer_address() {
        let signer = TestSigner::from_seed(7);
        let hash = [0x11; 32];
        let sig = signer.sign(&hash);
        assert_eq!(recover(&hash, &sig), Some(signer.address()));
    }

    #[test]
    fn recover_rejects_other_message() {
        let signer = TestSigner::from_seed(7);
        let sig = signer.sign(&[0x11; 32]);
        assert_eq!(recover(&[0x12; 32], &sig), None);
    }

    #[test]
    fn recover_rejects_swapped_key() {
        let alice = TestSigner::from_seed(1);
        let bob = TestSigner::from_seed(2);
        let hash = [0x22; 32];
        let sig = alice.sign(&hash);
        let bob_key = bob.sign(&hash).pubkey();
        let forged = Signature::from_parts(&bob_key, &sig.signature_bytes());
        assert_eq!(recover(&hash, &forged), None);
    }

    #[test]
    fn empty_signature_recovers_nothing() {
        assert_eq!(recover(&[0u8; 32], &Signature::EMPTY), None);
    }

    #[test]
    fn random_bytes_do_not_recover() {
        let junk = Signature(rand::random::<[u8; 32]>().repeat(3).try_into().unwrap());
        assert_eq!(recover(&[5u8; 32], &junk), None);
    }

    #[test]
    fn distinct_seeds_give_distinct_addresses() {
        assert_ne!(
            TestSigner::from_seed(1).address(),
            TestSigner::from_seed(2).address()
        );
    }
}
