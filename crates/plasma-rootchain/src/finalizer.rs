//! Draining mature exits into withdrawable balances.
//!
//! The same loop runs over both queues. Each call pays exits oldest key
//! first until one of three things happens:
//!
//! 1. the queue is empty,
//! 2. the head exit has not reached maturity,
//! 3. paying the head would leave liabilities above held collateral.
//!
//! For the third check the bonds of every other PENDING exit, in either
//! queue, count as already owed: a challenge can credit them at any time.
//!
//! Heads that are no longer PENDING (challenged since they were queued)
//! are dropped unpaid on the way. Finalizing never fails; whatever is
//! left waits for a later call.

use std::fmt::Display;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use plasma_proofs::{ProofVerifier, TransactionDecoder};
use plasma_types::{CallContext, DepositNonce, Exit, ExitEvent, Priority};
use rust_decimal::Decimal;

use crate::balance_ledger::BalanceLedger;
use crate::exit_queue::ExitQueue;
use crate::root_chain::RootChain;

/// Why a finalizer call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStop {
    /// Nothing left in the queue.
    Empty,
    /// The head exit is younger than the maturity window.
    Immature,
    /// Held collateral cannot cover the head exit's payout.
    CollateralShortfall,
}

/// Outcome of one finalizer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Exits marked FINALIZED and credited.
    pub paid: usize,
    /// Non-PENDING keys dropped from the queue.
    pub skipped: usize,
    /// Total credited to owners in this call.
    pub credited: Decimal,
    /// Keys still queued afterwards.
    pub remaining: usize,
    pub stopped: FinalizeStop,
}

impl<V: ProofVerifier, D: TransactionDecoder> RootChain<V, D> {
    /// Finalize mature UTXO exits. Anyone may call this.
    pub fn finalize_exits(&mut self, ctx: &CallContext) -> FinalizeReport {
        let reserved_elsewhere = self.deposit_exits.pending_bonds();
        let report = drain(
            &mut self.utxo_exits,
            &mut self.ledger,
            &mut self.events,
            ctx.now,
            self.config.maturity(),
            reserved_elsewhere,
            |priority: Priority, exit: &Exit| ExitEvent::ExitFinalized {
                priority,
                owner: exit.owner,
                payout: exit.payout(),
            },
        );
        log_report("utxo", &report);
        report
    }

    /// Finalize mature deposit exits. Anyone may call this.
    pub fn finalize_deposit_exits(&mut self, ctx: &CallContext) -> FinalizeReport {
        let reserved_elsewhere = self.utxo_exits.pending_bonds();
        let report = drain(
            &mut self.deposit_exits,
            &mut self.ledger,
            &mut self.events,
            ctx.now,
            self.config.maturity(),
            reserved_elsewhere,
            |nonce: DepositNonce, exit: &Exit| ExitEvent::DepositExitFinalized {
                nonce,
                owner: exit.owner,
                payout: exit.payout(),
            },
        );
        log_report("deposit", &report);
        report
    }
}

fn drain<K>(
    queue: &mut ExitQueue<K>,
    ledger: &mut BalanceLedger,
    events: &mut Vec<ExitEvent>,
    now: DateTime<Utc>,
    maturity: chrono::Duration,
    reserved_elsewhere: Decimal,
    finalized_event: impl Fn(K, &Exit) -> ExitEvent,
) -> FinalizeReport
where
    K: Ord + Hash + Copy + Display,
{
    let mut paid = 0;
    let mut skipped = 0;
    let mut credited = Decimal::ZERO;

    let stopped = loop {
        let Some((key, head)) = queue.peek() else {
            break FinalizeStop::Empty;
        };
        if !head.is_mature(now, maturity) {
            break FinalizeStop::Immature;
        }
        if !head.is_pending() {
            tracing::debug!(key = %key, state = %head.state, "Dropping non-pending exit");
            queue.pop();
            skipped += 1;
            events.push(ExitEvent::ExitSkipped {
                key: key.to_string(),
            });
            continue;
        }
        // Challengers of the other PENDING exits must still be payable.
        let reserved = reserved_elsewhere + queue.pending_bonds() - head.bond;
        if !ledger.can_cover(head.payout(), reserved) {
            tracing::warn!(
                key = %key,
                payout = %head.payout(),
                reserved = %reserved,
                liabilities = %ledger.total_withdrawable(),
                held = %ledger.held_collateral(),
                "Finalization deferred: collateral shortfall"
            );
            break FinalizeStop::CollateralShortfall;
        }

        match queue.finalize_head() {
            Ok((key, exit)) => {
                let payout = exit.payout();
                ledger.credit(exit.owner, payout);
                credited += payout;
                paid += 1;
                tracing::debug!(key = %key, owner = %exit.owner, payout = %payout, "Exit finalized");
                events.push(finalized_event(key, &exit));
            }
            Err(err) => {
                tracing::error!(key = %key, error = %err, "Queue head could not be finalized");
                queue.pop();
                skipped += 1;
            }
        }
    };

    FinalizeReport {
        paid,
        skipped,
        credited,
        remaining: queue.queued(),
        stopped,
    }
}

fn log_report(queue: &str, report: &FinalizeReport) {
    if report.paid == 0 && report.skipped == 0 {
        return;
    }
    tracing::info!(
        queue,
        paid = report.paid,
        skipped = report.skipped,
        credited = %report.credited,
        remaining = report.remaining,
        stopped = ?report.stopped,
        "Finalization pass complete"
    );
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use plasma_types::{Address, ExitGameConfig, ExitState, UtxoPosition};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()
    }

    fn chain() -> RootChain {
        let cfg = ExitGameConfig {
            min_exit_bond: Decimal::new(10, 0),
            ..ExitGameConfig::with_operator(Address::from_seed(0xAA))
        };
        RootChain::new(cfg).unwrap()
    }

    fn at(caller: Address, now: DateTime<Utc>) -> CallContext {
        CallContext::new(caller, now)
    }

    /// Queue a UTXO exit directly, locking its full payout.
    fn queue_exit(rc: &mut RootChain, priority: u128, owner: Address, amount: i64) {
        let exit = Exit::pending(
            owner,
            Decimal::new(amount, 0),
            Decimal::new(10, 0),
            UtxoPosition::new(1, 0, 0),
            t0(),
        );
        rc.lock(exit.payout());
        rc.utxo_exits.insert(Priority(priority), exit).unwrap();
    }

    #[test]
    fn empty_queue_is_noop() {
        let mut rc = chain();
        let report = rc.finalize_exits(&at(Address::from_seed(1), t0()));
        assert_eq!(report.paid, 0);
        assert_eq!(report.stopped, FinalizeStop::Empty);
        assert!(rc.events().is_empty());
    }

    #[test]
    fn immature_exit_waits() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        queue_exit(&mut rc, 3, alice, 50);

        let just_short = t0() + Duration::weeks(1) - Duration::seconds(1);
        let report = rc.finalize_exits(&at(alice, just_short));
        assert_eq!(report.stopped, FinalizeStop::Immature);
        assert_eq!(report.remaining, 1);
        assert_eq!(rc.balance_of(alice), Decimal::ZERO);

        let report = rc.finalize_exits(&at(alice, t0() + Duration::weeks(1)));
        assert_eq!(report.paid, 1);
        assert_eq!(rc.balance_of(alice), Decimal::new(60, 0));
    }

    #[test]
    fn lower_priority_drains_first() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        let bob = Address::from_seed(2);
        queue_exit(&mut rc, 7, alice, 70);
        queue_exit(&mut rc, 3, bob, 30);

        rc.take_events();
        let report = rc.finalize_exits(&at(alice, t0() + Duration::weeks(2)));
        assert_eq!(report.paid, 2);
        let events = rc.take_events();
        assert!(matches!(
            events[0],
            ExitEvent::ExitFinalized { priority: Priority(3), .. }
        ));
        assert!(matches!(
            events[1],
            ExitEvent::ExitFinalized { priority: Priority(7), .. }
        ));
    }

    #[test]
    fn challenged_head_dropped_unpaid() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        let bob = Address::from_seed(2);
        queue_exit(&mut rc, 3, alice, 30);
        queue_exit(&mut rc, 7, bob, 70);
        rc.utxo_exits.challenge(&Priority(3)).unwrap();

        let report = rc.finalize_exits(&at(bob, t0() + Duration::weeks(1)));
        assert_eq!(report.skipped, 1);
        assert_eq!(report.paid, 1);
        assert_eq!(report.stopped, FinalizeStop::Empty);
        assert_eq!(rc.balance_of(alice), Decimal::ZERO);
        assert_eq!(rc.balance_of(bob), Decimal::new(80, 0));
        assert_eq!(rc.exit(Priority(3)).unwrap().state, ExitState::Challenged);
    }

    #[test]
    fn collateral_shortfall_stops_drain() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        let bob = Address::from_seed(2);
        queue_exit(&mut rc, 3, alice, 30);
        // Only Bob's bond is backed, not his amount.
        rc.lock(Decimal::new(10, 0));
        rc.utxo_exits
            .insert(
                Priority(7),
                Exit::pending(bob, Decimal::new(500, 0), Decimal::new(10, 0), UtxoPosition::ZERO, t0()),
            )
            .unwrap();

        let later = at(alice, t0() + Duration::weeks(1));
        let report = rc.finalize_exits(&later);
        assert_eq!(report.paid, 1);
        assert_eq!(report.stopped, FinalizeStop::CollateralShortfall);
        assert_eq!(rc.exit(Priority(7)).unwrap().state, ExitState::Pending);
        assert!(rc.total_withdraw_balance() <= rc.held_collateral());

        // Topping up collateral lets the next call finish the job.
        rc.lock(Decimal::new(500, 0));
        let report = rc.finalize_exits(&later);
        assert_eq!(report.paid, 1);
        assert_eq!(rc.balance_of(bob), Decimal::new(510, 0));
    }

    #[test]
    fn other_pending_bonds_are_reserved() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        let bob = Address::from_seed(2);
        queue_exit(&mut rc, 3, alice, 30);
        // A pending deposit exit whose bond was never locked.
        rc.deposit_exits
            .insert(
                DepositNonce(1),
                Exit::pending(bob, Decimal::ZERO, Decimal::new(10, 0), UtxoPosition::ZERO, t0()),
            )
            .unwrap();

        let later = at(alice, t0() + Duration::weeks(1));
        let report = rc.finalize_exits(&later);
        assert_eq!(report.paid, 0);
        assert_eq!(report.stopped, FinalizeStop::CollateralShortfall);
        assert_eq!(rc.balance_of(alice), Decimal::ZERO);

        rc.lock(Decimal::new(10, 0));
        let report = rc.finalize_exits(&later);
        assert_eq!(report.paid, 1);
        assert_eq!(rc.balance_of(alice), Decimal::new(40, 0));
        assert_eq!(rc.total_withdraw_balance() + rc.pending_bonds(), rc.held_collateral());
    }

    #[test]
    fn repeated_calls_pay_once() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        queue_exit(&mut rc, 3, alice, 30);
        let later = at(alice, t0() + Duration::weeks(1));
        assert_eq!(rc.finalize_exits(&later).paid, 1);
        assert_eq!(rc.finalize_exits(&later).paid, 0);
        assert_eq!(rc.balance_of(alice), Decimal::new(40, 0));
        assert_eq!(rc.exit(Priority(3)).unwrap().state, ExitState::Finalized);
    }

    #[test]
    fn queues_are_independent() {
        let mut rc = chain();
        let alice = Address::from_seed(1);
        queue_exit(&mut rc, 3, alice, 30);
        let report = rc.finalize_deposit_exits(&at(alice, t0() + Duration::weeks(1)));
        assert_eq!(report.stopped, FinalizeStop::Empty);
        assert_eq!(rc.exit_queue_len(), 1);
    }
}
