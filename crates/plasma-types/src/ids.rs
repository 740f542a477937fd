//! Identifiers and position keys used throughout the exit game.
//!
//! Child blocks and deposits are keyed by monotonic counters that start at 1;
//! the zero value of each is reserved to mean "absent" inside a decoded
//! transaction. Exits are keyed by a [`Priority`] derived from a
//! [`UtxoPosition`] (UTXO exits) or by the [`DepositNonce`] (deposit exits).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{PlasmaError, Result};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address on the root ledger.
///
/// Serialized as a `0x`-prefixed lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Marks an absent input owner.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Derive an address from a 32-byte public key: the last 20 bytes of
    /// `SHA-256(pubkey)`.
    #[must_use]
    pub fn from_pubkey(pubkey: &[u8; 32]) -> Self {
        let digest = Sha256::digest(pubkey);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = PlasmaError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| PlasmaError::MalformedTransaction {
            reason: format!("address {s:?} is not hex: {e}"),
        })?;
        let bytes: [u8; 20] =
            bytes
                .try_into()
                .map_err(|b: Vec<u8>| PlasmaError::MalformedTransaction {
                    reason: format!("address must be 20 bytes, got {}", b.len()),
                })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = PlasmaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// Deterministic address for fixtures: every byte set to `seed`.
    #[must_use]
    pub fn from_seed(seed: u8) -> Self {
        Self([seed; 20])
    }
}

#[cfg(feature = "test-helpers")]
impl Address {
    /// Random address for fixtures.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 20]>())
    }
}

// ---------------------------------------------------------------------------
// BlockNumber / DepositNonce
// ---------------------------------------------------------------------------

/// Sequential child block number. The first committed block is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    /// The number assigned to the first committed block.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block:{}", self.0)
    }
}

/// Monotonic deposit nonce. The first deposit gets nonce 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct DepositNonce(pub u64);

impl DepositNonce {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DepositNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deposit:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Total-order key over UTXO exits. Smaller is served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Priority(pub u128);

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prio:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// UtxoPosition
// ---------------------------------------------------------------------------

/// Location of an unspent output on the child ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct UtxoPosition {
    pub block: u64,
    pub tx_index: u64,
    pub output_index: u64,
}

impl UtxoPosition {
    /// Zeroed position, recorded on deposit exits.
    pub const ZERO: Self = Self {
        block: 0,
        tx_index: 0,
        output_index: 0,
    };

    #[must_use]
    pub fn new(block: u64, tx_index: u64, output_index: u64) -> Self {
        Self {
            block,
            tx_index,
            output_index,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Derive the exit priority `block·B + tx_index·T + output_index`.
    ///
    /// The mapping is only order-preserving while `output_index < 2`
    /// (a transaction has two outputs) and `tx_index·T + output_index < B`;
    /// positions outside that range are rejected rather than allowed to
    /// collide with a neighbouring block's keys.
    ///
    /// # Errors
    /// Returns [`PlasmaError::InvalidPosition`] for positions outside the
    /// order-preserving range.
    pub fn priority(&self, block_index_factor: u128, tx_index_factor: u128) -> Result<Priority> {
        if self.output_index >= 2 {
            return Err(PlasmaError::InvalidPosition {
                position: *self,
                reason: "output index must be 0 or 1".to_string(),
            });
        }
        let within_block = u128::from(self.tx_index)
            .checked_mul(tx_index_factor)
            .and_then(|v| v.checked_add(u128::from(self.output_index)))
            .filter(|v| *v < block_index_factor)
            .ok_or_else(|| PlasmaError::InvalidPosition {
                position: *self,
                reason: format!("tx index exceeds {}", block_index_factor / tx_index_factor),
            })?;
        u128::from(self.block)
            .checked_mul(block_index_factor)
            .and_then(|v| v.checked_add(within_block))
            .map(Priority)
            .ok_or_else(|| PlasmaError::InvalidPosition {
                position: *self,
                reason: "priority overflow".to_string(),
            })
    }
}

impl fmt::Display for UtxoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.block, self.tx_index, self.output_index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BLOCK_INDEX_FACTOR, TX_INDEX_FACTOR};

    fn prio(block: u64, tx: u64, out: u64) -> Priority {
        UtxoPosition::new(block, tx, out)
            .priority(BLOCK_INDEX_FACTOR, TX_INDEX_FACTOR)
            .unwrap()
    }

    #[test]
    fn priority_is_linear() {
        assert_eq!(prio(5, 2, 1), Priority(5_000_020_001));
        assert_eq!(prio(1, 0, 0), Priority(1_000_000_000));
    }

    #[test]
    fn priority_preserves_position_order() {
        let positions = [
            (1, 0, 0),
            (1, 0, 1),
            (1, 1, 0),
            (1, 99_999, 1),
            (2, 0, 0),
            (7, 3, 1),
        ];
        for pair in positions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(prio(a.0, a.1, a.2) < prio(b.0, b.1, b.2), "{a:?} !< {b:?}");
        }
    }

    #[test]
    fn output_index_out_of_range_rejected() {
        let err = UtxoPosition::new(1, 0, 2)
            .priority(BLOCK_INDEX_FACTOR, TX_INDEX_FACTOR)
            .unwrap_err();
        assert!(matches!(err, PlasmaError::InvalidPosition { .. }));
    }

    #[test]
    fn tx_index_spilling_into_next_block_rejected() {
        let err = UtxoPosition::new(1, 100_000, 0)
            .priority(BLOCK_INDEX_FACTOR, TX_INDEX_FACTOR)
            .unwrap_err();
        assert!(matches!(err, PlasmaError::InvalidPosition { .. }));
    }

    #[test]
    fn address_hex_roundtrip() {
        let addr = Address::from_seed(0xab);
        let text = addr.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("zz".parse::<Address>().is_err());
    }

    #[test]
    fn address_from_pubkey_is_stable() {
        let a = Address::from_pubkey(&[7u8; 32]);
        let b = Address::from_pubkey(&[7u8; 32]);
        let c = Address::from_pubkey(&[8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_zero());
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr = Address::from_seed(1);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn counters_advance() {
        assert_eq!(BlockNumber::FIRST.next(), BlockNumber(2));
        assert_eq!(DepositNonce(9).next(), DepositNonce(10));
    }
}
