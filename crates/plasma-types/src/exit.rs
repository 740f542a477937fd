//! # Exit: a claim to withdraw root-ledger value
//!
//! UTXO exits and deposit exits share this record shape; they live in
//! separate registries keyed by priority and deposit nonce respectively.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  start   ┌─────────┐  challenge   ┌────────────┐
//!   │ NONE ├─────────▶│ PENDING ├─────────────▶│ CHALLENGED │
//!   └──────┘          └────┬────┘              └────────────┘
//!                          │ finalize
//!                          ▼
//!                    ┌───────────┐
//!                    │ FINALIZED │
//!                    └───────────┘
//! ```
//!
//! CHALLENGED and FINALIZED are terminal. Records are never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, PlasmaError, Result, UtxoPosition};

/// The lifecycle state of an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExitState {
    /// No exit has been started under this key.
    #[default]
    None,
    /// Started and awaiting maturity; can still be challenged.
    Pending,
    /// Proven invalid. The bond went to the challenger. **Terminal.**
    Challenged,
    /// Paid out to the owner. **Terminal.**
    Finalized,
}

impl ExitState {
    /// Can an exit in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::None, Self::Pending) | (Self::Pending, Self::Challenged | Self::Finalized)
        )
    }

    /// Whether the state can never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Challenged | Self::Finalized)
    }
}

impl std::fmt::Display for ExitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Pending => write!(f, "PENDING"),
            Self::Challenged => write!(f, "CHALLENGED"),
            Self::Finalized => write!(f, "FINALIZED"),
        }
    }
}

/// An exit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Who receives `amount + bond` on finalization.
    pub owner: Address,
    /// Value claimed from the UTXO or deposit.
    pub amount: Decimal,
    /// Bond retained with the exit; forfeited to a successful challenger.
    pub bond: Decimal,
    /// Position of the exited output. Zeroed for deposit exits.
    pub utxo_pos: UtxoPosition,
    /// Ledger time at which the exit was started.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub state: ExitState,
}

impl Exit {
    /// Create a new PENDING exit.
    #[must_use]
    pub fn pending(
        owner: Address,
        amount: Decimal,
        bond: Decimal,
        utxo_pos: UtxoPosition,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner,
            amount,
            bond,
            utxo_pos,
            created_at,
            state: ExitState::Pending,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == ExitState::Pending
    }

    /// Total paid to the owner on finalization.
    #[must_use]
    pub fn payout(&self) -> Decimal {
        self.amount + self.bond
    }

    /// Whether the exit has been pending for at least `maturity` at `now`.
    #[must_use]
    pub fn is_mature(&self, now: DateTime<Utc>, maturity: chrono::Duration) -> bool {
        now.signed_duration_since(self.created_at) >= maturity
    }

    /// Transition PENDING → CHALLENGED.
    ///
    /// # Errors
    /// Returns [`PlasmaError::InvalidStateTransition`] from any other state.
    pub fn mark_challenged(&mut self) -> Result<()> {
        self.transition(ExitState::Challenged)
    }

    /// Transition PENDING → FINALIZED.
    ///
    /// # Errors
    /// Returns [`PlasmaError::InvalidStateTransition`] from any other state.
    pub fn mark_finalized(&mut self) -> Result<()> {
        self.transition(ExitState::Finalized)
    }

    fn transition(&mut self, target: ExitState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(PlasmaError::InvalidStateTransition {
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}
