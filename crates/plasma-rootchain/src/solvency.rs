//! Solvency invariant checker.
//!
//! Invariants, checked on demand:
//! ```text
//! held_collateral                    == Σ(locked) - Σ(paid out)
//! total_withdrawable                 == Σ(balances)
//! total_withdrawable + pending bonds <= held_collateral
//! ```
//!
//! The first two catch bookkeeping drift inside the ledger. The third
//! means every credited balance can be paid, and so can the challenger of
//! any exit still PENDING.

use plasma_types::{PlasmaError, Result};
use rust_decimal::Decimal;

use crate::balance_ledger::BalanceLedger;

/// Tracks value entering and leaving the root ledger independently of the
/// [`BalanceLedger`], and cross-checks the two.
#[derive(Debug, Clone, Default)]
pub struct SolvencyMonitor {
    /// Total value locked by deposits and exit bonds since genesis.
    locked: Decimal,
    /// Total value sent out by withdrawals since genesis.
    paid_out: Decimal,
}

impl SolvencyMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lock(&mut self, amount: Decimal) {
        self.locked += amount;
    }

    pub fn record_payout(&mut self, amount: Decimal) {
        self.paid_out += amount;
    }

    /// Collateral the ledger should be holding.
    #[must_use]
    pub fn expected_collateral(&self) -> Decimal {
        self.locked - self.paid_out
    }

    /// Check every invariant against `ledger`, with `pending_bonds` held by
    /// exits that can still be challenged.
    ///
    /// # Errors
    /// Returns [`PlasmaError::SolvencyViolation`] naming the first broken
    /// invariant.
    pub fn verify(&self, ledger: &BalanceLedger, pending_bonds: Decimal) -> Result<()> {
        let expected = self.expected_collateral();
        let held = ledger.held_collateral();
        if held != expected {
            return Err(PlasmaError::SolvencyViolation {
                reason: format!(
                    "held collateral {held} != expected {expected} \
                     (locked={}, paid_out={})",
                    self.locked, self.paid_out
                ),
            });
        }

        let total = ledger.total_withdrawable();
        let sum = ledger.sum_of_balances();
        if total != sum {
            return Err(PlasmaError::SolvencyViolation {
                reason: format!("total withdrawable {total} != sum of balances {sum}"),
            });
        }

        if total > held {
            return Err(PlasmaError::SolvencyViolation {
                reason: format!("total withdrawable {total} exceeds held collateral {held}"),
            });
        }
        if total + pending_bonds > held {
            return Err(PlasmaError::SolvencyViolation {
                reason: format!(
                    "total withdrawable {total} plus pending bonds {pending_bonds} \
                     exceeds held collateral {held}"
                ),
            });
        }
        Ok(())
    }
}
