//! Outbound value movement from the root ledger to an address.

use plasma_types::{Address, PlasmaError, Result};
use rust_decimal::Decimal;

/// Sends value out of the root ledger.
///
/// Called by withdrawals after the balance has already been zeroed. An
/// `Err` makes the withdrawal roll back, so implementations must not have
/// moved any value when they fail.
pub trait ValueTransfer {
    /// # Errors
    /// Any error; the caller reports it as [`PlasmaError::TransferFailed`].
    fn transfer(&mut self, to: Address, amount: Decimal) -> Result<()>;
}

/// In-memory transfer sink that records every payout.
///
/// Useful when the root ledger is simulated in-process. It can be told to
/// reject a recipient to exercise the rollback path.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransfer {
    payouts: Vec<(Address, Decimal)>,
    rejected: Option<Address>,
}

impl RecordingTransfer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every transfer to `to` until [`accept_all`](Self::accept_all).
    pub fn reject(&mut self, to: Address) {
        self.rejected = Some(to);
    }

    pub fn accept_all(&mut self) {
        self.rejected = None;
    }

    /// Payouts made so far, in order.
    #[must_use]
    pub fn payouts(&self) -> &[(Address, Decimal)] {
        &self.payouts
    }

    /// Total value sent to `to`.
    #[must_use]
    pub fn total_sent_to(&self, to: Address) -> Decimal {
        self.payouts
            .iter()
            .filter(|(addr, _)| *addr == to)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn transfer(&mut self, to: Address, amount: Decimal) -> Result<()> {
        if self.rejected == Some(to) {
            return Err(PlasmaError::TransferFailed {
                to,
                amount,
                reason: "recipient rejected the transfer".to_string(),
            });
        }
        self.payouts.push((to, amount));
        Ok(())
    }
}
