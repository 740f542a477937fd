//! Withdrawable balances and the collateral backing them.
//!
//! Every value-bearing call locks its attached value into `held_collateral`.
//! Finalized exits, challenge rewards and excess bonds become withdrawable
//! balances; `total_withdrawable` is their sum. Value only leaves through
//! [`BalanceLedger::withdraw`], which reduces both sides together.

use std::collections::HashMap;

use plasma_types::{Address, PlasmaError, Result};
use rust_decimal::Decimal;

use crate::transfer::ValueTransfer;

/// Pull-payment ledger.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<Address, Decimal>,
    total_withdrawable: Decimal,
    held_collateral: Decimal,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock value attached to a deposit or exit.
    pub fn lock(&mut self, amount: Decimal) {
        self.held_collateral += amount;
    }

    /// Make `amount` withdrawable by `owner`.
    pub fn credit(&mut self, owner: Address, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        *self.balances.entry(owner).or_insert(Decimal::ZERO) += amount;
        self.total_withdrawable += amount;
    }

    /// Whether crediting `amount` more keeps liabilities, plus `reserved`
    /// still owed elsewhere, within held collateral.
    #[must_use]
    pub fn can_cover(&self, amount: Decimal, reserved: Decimal) -> bool {
        self.total_withdrawable + amount + reserved <= self.held_collateral
    }

    /// Guarded [`credit`](Self::credit).
    ///
    /// # Errors
    /// Returns [`PlasmaError::CollateralShortfall`] if the credit would push
    /// total liabilities above held collateral. Nothing is credited then.
    pub fn try_credit(&mut self, owner: Address, amount: Decimal) -> Result<()> {
        if !self.can_cover(amount, Decimal::ZERO) {
            return Err(PlasmaError::CollateralShortfall {
                needed: self.total_withdrawable + amount,
                held: self.held_collateral,
            });
        }
        self.credit(owner, amount);
        Ok(())
    }

    #[must_use]
    pub fn balance_of(&self, owner: Address) -> Decimal {
        self.balances.get(&owner).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_withdrawable(&self) -> Decimal {
        self.total_withdrawable
    }

    #[must_use]
    pub fn held_collateral(&self) -> Decimal {
        self.held_collateral
    }

    /// Sum of every individual balance.
    #[must_use]
    pub fn sum_of_balances(&self) -> Decimal {
        self.balances.values().copied().sum()
    }

    /// Send `owner`'s whole balance through `transfer`.
    ///
    /// The balance is zeroed before the transfer is attempted. If the
    /// transfer fails, the balance and both totals are restored and
    /// [`PlasmaError::TransferFailed`] is returned. A zero balance is a
    /// no-op returning `Ok(0)`.
    pub fn withdraw(
        &mut self,
        owner: Address,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Decimal> {
        let amount = self.balance_of(owner);
        if amount.is_zero() {
            return Ok(Decimal::ZERO);
        }

        self.balances.remove(&owner);
        self.total_withdrawable -= amount;
        self.held_collateral -= amount;

        if let Err(err) = transfer.transfer(owner, amount) {
            self.balances.insert(owner, amount);
            self.total_withdrawable += amount;
            self.held_collateral += amount;
            let reason = match err {
                PlasmaError::TransferFailed { reason, .. } => reason,
                other => other.to_string(),
            };
            return Err(PlasmaError::TransferFailed {
                to: owner,
                amount,
                reason,
            });
        }
        Ok(amount)
    }
}
