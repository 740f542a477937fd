//! Notifications emitted by committed exit game operations.
//!
//! Events are appended only after an operation has fully committed, so a
//! rejected call never leaves an event behind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, BlockNumber, DepositNonce, Priority, UtxoPosition};

/// The kind of state change an [`ExitEvent`] records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExitEvent {
    BlockSubmitted {
        block: BlockNumber,
        merkle_root: [u8; 32],
    },
    Deposited {
        nonce: DepositNonce,
        owner: Address,
        amount: Decimal,
    },
    ExitStarted {
        priority: Priority,
        owner: Address,
        amount: Decimal,
        utxo_pos: UtxoPosition,
    },
    DepositExitStarted {
        nonce: DepositNonce,
        owner: Address,
        amount: Decimal,
    },
    ExitChallenged {
        priority: Priority,
        challenger: Address,
    },
    DepositExitChallenged {
        nonce: DepositNonce,
        challenger: Address,
    },
    ExitFinalized {
        priority: Priority,
        owner: Address,
        payout: Decimal,
    },
    DepositExitFinalized {
        nonce: DepositNonce,
        owner: Address,
        payout: Decimal,
    },
    /// A queued key whose exit was no longer PENDING was dropped unpaid.
    ExitSkipped { key: String },
    Withdrawn {
        owner: Address,
        amount: Decimal,
    },
}

impl std::fmt::Display for ExitEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockSubmitted { .. } => write!(f, "BLOCK_SUBMITTED"),
            Self::Deposited { .. } => write!(f, "DEPOSITED"),
            Self::ExitStarted { .. } => write!(f, "EXIT_STARTED"),
            Self::DepositExitStarted { .. } => write!(f, "DEPOSIT_EXIT_STARTED"),
            Self::ExitChallenged { .. } => write!(f, "EXIT_CHALLENGED"),
            Self::DepositExitChallenged { .. } => write!(f, "DEPOSIT_EXIT_CHALLENGED"),
            Self::ExitFinalized { .. } => write!(f, "EXIT_FINALIZED"),
            Self::DepositExitFinalized { .. } => write!(f, "DEPOSIT_EXIT_FINALIZED"),
            Self::ExitSkipped { .. } => write!(f, "EXIT_SKIPPED"),
            Self::Withdrawn { .. } => write!(f, "WITHDRAWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_display() {
        let ev = ExitEvent::Withdrawn {
            owner: Address::ZERO,
            amount: Decimal::ONE,
        };
        assert_eq!(ev.to_string(), "WITHDRAWN");
        let skipped = ExitEvent::ExitSkipped {
            key: "prio:3".to_string(),
        };
        assert_eq!(skipped.to_string(), "EXIT_SKIPPED");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let ev = ExitEvent::DepositExitStarted {
            nonce: DepositNonce(3),
            owner: Address::from_seed(2),
            amount: Decimal::new(100, 0),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "deposit_exit_started");
        let back: ExitEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
