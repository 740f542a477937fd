//! Merkle-membership and signature checks consumed by the exit game.

use plasma_types::{Address, Hash32, Signature, TxSignatures};

use crate::hashing::{confirmation_hash, merkle_hash};
use crate::{merkle, signature};

/// Proof primitives the exit game relies on. An embedding ledger can supply
/// its own; [`Sha256Verifier`] is the default.
pub trait ProofVerifier {
    /// Whether `leaf` is included at `index` under `root`.
    fn check_membership(&self, leaf: &Hash32, index: u64, root: &Hash32, proof: &[u8]) -> bool;

    /// Whether the input and confirmation signatures match the declared
    /// input owners for a transaction committed under `root`.
    fn check_sigs(
        &self,
        tx_hash: &Hash32,
        root: &Hash32,
        owner0: Address,
        owner1: Address,
        sigs: &TxSignatures,
    ) -> bool;

    /// The address that produced `signature` over `hash`, if any.
    fn recover(&self, hash: &Hash32, signature: &Signature) -> Option<Address>;
}

/// SHA-256 merkle trees with recoverable ed25519 signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl ProofVerifier for Sha256Verifier {
    fn check_membership(&self, leaf: &Hash32, index: u64, root: &Hash32, proof: &[u8]) -> bool {
        merkle::check_membership(leaf, index, root, proof)
    }

    /// The first input must have an owner. For every slot with a non-zero
    /// owner, the input signature over `tx_hash` and the confirmation
    /// signature over `confirmation_hash(merkle_hash, root)` must both
    /// recover to that owner.
    fn check_sigs(
        &self,
        tx_hash: &Hash32,
        root: &Hash32,
        owner0: Address,
        owner1: Address,
        sigs: &TxSignatures,
    ) -> bool {
        if owner0.is_zero() {
            return false;
        }
        let confirm = confirmation_hash(&merkle_hash(tx_hash, sigs), root);
        [owner0, owner1]
            .iter()
            .zip(sigs.inputs.iter().zip(sigs.confirmations.iter()))
            .filter(|(owner, _)| !owner.is_zero())
            .all(|(owner, (input_sig, confirm_sig))| {
                self.recover(tx_hash, input_sig) == Some(*owner)
                    && self.recover(&confirm, confirm_sig) == Some(*owner)
            })
    }

    fn recover(&self, hash: &Hash32, signature: &Signature) -> Option<Address> {
        signature::recover(hash, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::tx_hash;
    use crate::signature::TestSigner;

    fn signed(
        tx: &Hash32,
        root: &Hash32,
        owners: [Option<&TestSigner>; 2],
    ) -> TxSignatures {
        let mut sigs = TxSignatures::default();
        for (slot, owner) in owners.iter().enumerate() {
            if let Some(signer) = owner {
                sigs.inputs[slot] = signer.sign(tx);
            }
        }
        let confirm = confirmation_hash(&merkle_hash(tx, &sigs), root);
        for (slot, owner) in owners.iter().enumerate() {
            if let Some(signer) = owner {
                sigs.confirmations[slot] = signer.sign(&confirm);
            }
        }
        sigs
    }

    #[test]
    fn single_input_signatures_verify() {
        let alice = TestSigner::from_seed(1);
        let tx = tx_hash(b"tx");
        let root = [4u8; 32];
        let sigs = signed(&tx, &root, [Some(&alice), None]);
        assert!(Sha256Verifier.check_sigs(&tx, &root, alice.address(), Address::ZERO, &sigs));
    }

    #[test]
    fn two_input_signatures_verify() {
        let alice = TestSigner::from_seed(1);
        let bob = TestSigner::from_seed(2);
        let tx = tx_hash(b"tx");
        let root = [4u8; 32];
        let sigs = signed(&tx, &root, [Some(&alice), Some(&bob)]);
        assert!(Sha256Verifier.check_sigs(&tx, &root, alice.address(), bob.address(), &sigs));
        assert!(!Sha256Verifier.check_sigs(&tx, &root, bob.address(), alice.address(), &sigs));
    }

    #[test]
    fn confirmation_bound_to_root() {
        let alice = TestSigner::from_seed(1);
        let tx = tx_hash(b"tx");
        let sigs = signed(&tx, &[4u8; 32], [Some(&alice), None]);
        assert!(!Sha256Verifier.check_sigs(
            &tx,
            &[5u8; 32],
            alice.address(),
            Address::ZERO,
            &sigs
        ));
    }

    #[test]
    fn missing_second_signature_fails_when_owner_declared() {
        let alice = TestSigner::from_seed(1);
        let bob = TestSigner::from_seed(2);
        let tx = tx_hash(b"tx");
        let root = [4u8; 32];
        let sigs = signed(&tx, &root, [Some(&alice), None]);
        assert!(!Sha256Verifier.check_sigs(&tx, &root, alice.address(), bob.address(), &sigs));
    }

    #[test]
    fn zero_first_owner_rejected() {
        let tx = tx_hash(b"tx");
        let sigs = TxSignatures::default();
        assert!(!Sha256Verifier.check_sigs(&tx, &[0u8; 32], Address::ZERO, Address::ZERO, &sigs));
    }
}
