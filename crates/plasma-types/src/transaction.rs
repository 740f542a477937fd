//! Decoded child-ledger transactions and their signatures.
//!
//! A child transaction always decodes to 17 fields in a fixed layout:
//!
//! ```text
//!  0..6   input 0: block, tx_index, output_index, deposit_nonce, amount, confirm_sig
//!  6..12  input 1: block, tx_index, output_index, deposit_nonce, amount, confirm_sig
//! 12..16  outputs: owner 0, amount 0, owner 1, amount 1
//! 16      fee
//! ```
//!
//! An input with a zero position and a zero deposit nonce is absent.
//! A zero position with a non-zero nonce spends a deposit.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{SIGNATURE_LEN, TX_SLOTS};
use crate::{Address, DepositNonce, PlasmaError, Result, UtxoPosition};

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A recoverable signature: the signer's 32-byte public key followed by the
/// 64-byte signature. The all-zero value stands in for an absent signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(pub [u8; SIGNATURE_LEN]);

impl Signature {
    pub const EMPTY: Self = Self([0u8; SIGNATURE_LEN]);

    #[must_use]
    pub fn from_parts(pubkey: &[u8; 32], sig: &[u8; 64]) -> Self {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..32].copy_from_slice(pubkey);
        bytes[32..].copy_from_slice(sig);
        Self(bytes)
    }

    /// Parse from exactly [`SIGNATURE_LEN`] bytes.
    ///
    /// # Errors
    /// Returns [`PlasmaError::MalformedTransaction`] on any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SIGNATURE_LEN] =
            bytes
                .try_into()
                .map_err(|_| PlasmaError::MalformedTransaction {
                    reason: format!(
                        "signature must be {SIGNATURE_LEN} bytes, got {}",
                        bytes.len()
                    ),
                })?;
        Ok(Self(array))
    }

    #[must_use]
    pub fn pubkey(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key.copy_from_slice(&self.0[..32]);
        key
    }

    #[must_use]
    pub fn signature_bytes(&self) -> [u8; 64] {
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&self.0[32..]);
        sig
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{}..)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = PlasmaError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| PlasmaError::MalformedTransaction {
            reason: format!("signature is not hex: {e}"),
        })?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for Signature {
    type Error = PlasmaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_string()
    }
}

/// Signatures accompanying a transaction: one input signature over the
/// transaction hash and one confirmation signature per input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxSignatures {
    pub inputs: [Signature; TX_SLOTS],
    pub confirmations: [Signature; TX_SLOTS],
}

impl TxSignatures {
    /// Length of the packed byte form.
    pub const PACKED_LEN: usize = SIGNATURE_LEN * TX_SLOTS * 2;

    /// Pack as `input0 ‖ input1 ‖ confirm0 ‖ confirm1`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::PACKED_LEN);
        for sig in self.inputs.iter().chain(self.confirmations.iter()) {
            out.extend_from_slice(&sig.0);
        }
        out
    }

    /// Unpack the `input0 ‖ input1 ‖ confirm0 ‖ confirm1` form.
    ///
    /// # Errors
    /// Returns [`PlasmaError::MalformedTransaction`] if the length is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::PACKED_LEN {
            return Err(PlasmaError::MalformedTransaction {
                reason: format!(
                    "signature bundle must be {} bytes, got {}",
                    Self::PACKED_LEN,
                    bytes.len()
                ),
            });
        }
        let sigs = bytes
            .chunks_exact(SIGNATURE_LEN)
            .map(Signature::from_slice)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            inputs: [sigs[0], sigs[1]],
            confirmations: [sigs[2], sigs[3]],
        })
    }

    /// The bytes committed to in a transaction's merkle leaf.
    #[must_use]
    pub fn input_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_LEN * TX_SLOTS);
        for sig in &self.inputs {
            out.extend_from_slice(&sig.0);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Decoded transaction
// ---------------------------------------------------------------------------

/// One input slot of a decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxInput {
    pub position: UtxoPosition,
    pub deposit_nonce: DepositNonce,
    pub amount: Decimal,
    pub confirm_sig: Signature,
}

impl TxInput {
    /// An input with neither a position nor a deposit nonce is absent.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.position.is_zero() || self.deposit_nonce.0 != 0
    }

    /// Whether the input spends a deposit rather than a child-ledger output.
    #[must_use]
    pub fn spends_deposit(&self) -> bool {
        self.position.block == 0 && self.deposit_nonce.0 != 0
    }
}

/// One output slot of a decoded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxOutput {
    pub owner: Address,
    pub amount: Decimal,
}

/// A child transaction in its fixed 17-field layout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodedTransaction {
    pub inputs: [TxInput; TX_SLOTS],
    pub outputs: [TxOutput; TX_SLOTS],
    pub fee: Decimal,
}

impl DecodedTransaction {
    /// The output addressed by `output_index`.
    ///
    /// # Errors
    /// Returns [`PlasmaError::InvalidPosition`] if the index is not 0 or 1.
    pub fn output(&self, position: UtxoPosition) -> Result<&TxOutput> {
        usize::try_from(position.output_index)
            .ok()
            .and_then(|i| self.outputs.get(i))
            .ok_or_else(|| PlasmaError::InvalidPosition {
                position,
                reason: "output index must be 0 or 1".to_string(),
            })
    }

    /// The input in `slot` (0 or 1).
    ///
    /// # Errors
    /// Returns [`PlasmaError::MalformedTransaction`] if the slot is out of range.
    pub fn input(&self, slot: usize) -> Result<&TxInput> {
        self.inputs
            .get(slot)
            .ok_or_else(|| PlasmaError::MalformedTransaction {
                reason: format!("input slot {slot} out of range"),
            })
    }

    /// Whether any present input spends the deposit with this nonce.
    #[must_use]
    pub fn spends_deposit(&self, nonce: DepositNonce) -> bool {
        nonce.0 != 0
            && self
                .inputs
                .iter()
                .any(|input| input.deposit_nonce == nonce)
    }
}
