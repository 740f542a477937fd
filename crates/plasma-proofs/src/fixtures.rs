//! Transaction and block builders for tests. **Never use in production.**
//!
//! These play the part of child-ledger users and operator: encode a
//! transaction, sign its inputs, commit it into a block, then confirm it
//! against the committed root.

use plasma_types::{DecodedTransaction, Hash32, TxSignatures};

use crate::decoder::JsonTransactionDecoder;
use crate::hashing::{confirmation_hash, merkle_hash, tx_hash};
use crate::merkle::MerkleTree;
use crate::signature::TestSigner;

/// A transaction with its wire bytes and signatures.
#[derive(Clone, Debug)]
pub struct SignedTx {
    pub tx: DecodedTransaction,
    pub bytes: Vec<u8>,
    pub tx_hash: Hash32,
    pub sigs: TxSignatures,
}

impl SignedTx {
    /// Encode `tx` and sign each input slot that has a signer.
    #[must_use]
    pub fn new(tx: DecodedTransaction, signers: [Option<&TestSigner>; 2]) -> Self {
        let bytes = JsonTransactionDecoder::encode(&tx);
        let tx_hash = tx_hash(&bytes);
        let mut sigs = TxSignatures::default();
        for (slot, signer) in signers.iter().enumerate() {
            if let Some(signer) = signer {
                sigs.inputs[slot] = signer.sign(&tx_hash);
            }
        }
        Self {
            tx,
            bytes,
            tx_hash,
            sigs,
        }
    }

    /// The leaf this transaction occupies in its block.
    #[must_use]
    pub fn merkle_hash(&self) -> Hash32 {
        merkle_hash(&self.tx_hash, &self.sigs)
    }

    /// The message an owner signs to confirm this transaction under `root`.
    #[must_use]
    pub fn confirmation_hash(&self, root: &Hash32) -> Hash32 {
        confirmation_hash(&self.merkle_hash(), root)
    }

    /// Attach confirmation signatures for `root`.
    pub fn confirm(&mut self, root: &Hash32, signers: [Option<&TestSigner>; 2]) {
        let hash = self.confirmation_hash(root);
        for (slot, signer) in signers.iter().enumerate() {
            if let Some(signer) = signer {
                self.sigs.confirmations[slot] = signer.sign(&hash);
            }
        }
    }
}

/// A child block assembled from signed transactions, in index order.
#[derive(Clone, Debug)]
pub struct BlockFixture {
    tree: MerkleTree,
}

impl BlockFixture {
    /// Commit the given transactions at indices `0..txs.len()`.
    ///
    /// # Panics
    /// Panics if more transactions are given than a block can hold.
    #[must_use]
    pub fn new(txs: &[&SignedTx]) -> Self {
        let leaves: Vec<Hash32> = txs.iter().map(|t| t.merkle_hash()).collect();
        let tree = MerkleTree::from_leaves(&leaves).expect("too many transactions for one block");
        Self { tree }
    }

    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    /// # Panics
    /// Panics if no transaction sits at `index`.
    #[must_use]
    pub fn proof(&self, index: usize) -> Vec<u8> {
        self.tree.proof(index).expect("no transaction at index")
    }
}
