//! Append-only records anchored on the root ledger.
//!
//! Both are written once by their creating operation and never mutated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Address;

/// A 32-byte SHA-256 digest.
pub type Hash32 = [u8; 32];

/// A committed child block: its merkle root and the time it was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildBlock {
    pub merkle_root: Hash32,
    pub submitted_at: DateTime<Utc>,
}

/// Value locked on the root ledger on behalf of `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub owner: Address,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}
