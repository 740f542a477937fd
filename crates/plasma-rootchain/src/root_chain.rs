//! The root-ledger exit game state and its non-exit operations.
//!
//! [`RootChain`] owns every registry: committed child blocks, deposits,
//! the UTXO and deposit exit queues, the balance ledger, and the event
//! log. Exit operations live in [`crate::exit_game`], the finalizers in
//! [`crate::finalizer`].
//!
//! Each public operation validates fully before mutating anything, so an
//! `Err` leaves the state exactly as it was.

use std::collections::BTreeMap;

use plasma_proofs::{JsonTransactionDecoder, ProofVerifier, Sha256Verifier, TransactionDecoder};
use plasma_types::{
    Address, BlockNumber, CallContext, ChildBlock, Deposit, DepositNonce, Exit, ExitEvent,
    ExitGameConfig, Hash32, PlasmaError, Priority, Result,
};
use rust_decimal::Decimal;

use crate::balance_ledger::BalanceLedger;
use crate::exit_queue::ExitQueue;
use crate::solvency::SolvencyMonitor;
use crate::transfer::ValueTransfer;

/// The exit game, parameterised over its proof primitives.
pub struct RootChain<V = Sha256Verifier, D = JsonTransactionDecoder> {
    pub(crate) config: ExitGameConfig,
    pub(crate) verifier: V,
    pub(crate) decoder: D,
    pub(crate) child_blocks: BTreeMap<BlockNumber, ChildBlock>,
    pub(crate) deposits: BTreeMap<DepositNonce, Deposit>,
    pub(crate) next_block: BlockNumber,
    pub(crate) next_deposit: DepositNonce,
    pub(crate) utxo_exits: ExitQueue<Priority>,
    pub(crate) deposit_exits: ExitQueue<DepositNonce>,
    pub(crate) ledger: BalanceLedger,
    pub(crate) solvency: SolvencyMonitor,
    pub(crate) events: Vec<ExitEvent>,
}

impl RootChain {
    /// An exit game using the default SHA-256 / JSON primitives.
    ///
    /// # Errors
    /// Returns [`PlasmaError::Configuration`] if `config` is invalid.
    pub fn new(config: ExitGameConfig) -> Result<Self> {
        Self::with_primitives(config, Sha256Verifier, JsonTransactionDecoder)
    }
}

impl<V: ProofVerifier, D: TransactionDecoder> RootChain<V, D> {
    /// An exit game using caller-supplied proof primitives.
    pub fn with_primitives(config: ExitGameConfig, verifier: V, decoder: D) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            operator = %config.operator,
            min_exit_bond = %config.min_exit_bond,
            maturity_secs = config.maturity_secs,
            "Exit game initialised"
        );
        Ok(Self {
            config,
            verifier,
            decoder,
            child_blocks: BTreeMap::new(),
            deposits: BTreeMap::new(),
            next_block: BlockNumber::FIRST,
            next_deposit: DepositNonce::FIRST,
            utxo_exits: ExitQueue::new(),
            deposit_exits: ExitQueue::new(),
            ledger: BalanceLedger::new(),
            solvency: SolvencyMonitor::new(),
            events: Vec::new(),
        })
    }

    // =================================================================
    // Anchoring
    // =================================================================

    /// Commit the merkle root of the next child block.
    ///
    /// # Errors
    /// Returns [`PlasmaError::NotOperator`] unless the caller is the
    /// configured operator.
    pub fn submit_block(&mut self, ctx: &CallContext, merkle_root: Hash32) -> Result<BlockNumber> {
        if ctx.caller != self.config.operator {
            tracing::warn!(caller = %ctx.caller, "Block submission rejected: not operator");
            return Err(PlasmaError::NotOperator { caller: ctx.caller });
        }

        let block = self.next_block;
        self.child_blocks.insert(
            block,
            ChildBlock {
                merkle_root,
                submitted_at: ctx.now,
            },
        );
        self.next_block = block.next();

        tracing::info!(
            block = block.0,
            merkle_root = hex::encode(merkle_root),
            "Child block committed"
        );
        self.events.push(ExitEvent::BlockSubmitted { block, merkle_root });
        Ok(block)
    }

    /// Lock the attached value as a deposit for `owner`.
    ///
    /// # Errors
    /// Returns [`PlasmaError::ZeroDeposit`] if no value is attached.
    pub fn deposit(&mut self, ctx: &CallContext, owner: Address) -> Result<DepositNonce> {
        if ctx.value <= Decimal::ZERO {
            return Err(PlasmaError::ZeroDeposit);
        }

        let nonce = self.next_deposit;
        self.deposits.insert(
            nonce,
            Deposit {
                owner,
                amount: ctx.value,
                created_at: ctx.now,
            },
        );
        self.next_deposit = nonce.next();
        self.lock(ctx.value);

        tracing::info!(nonce = nonce.0, owner = %owner, amount = %ctx.value, "Deposit locked");
        self.events.push(ExitEvent::Deposited {
            nonce,
            owner,
            amount: ctx.value,
        });
        Ok(nonce)
    }

    // =================================================================
    // Withdrawals
    // =================================================================

    /// Pay the caller's whole withdrawable balance through `transfer`.
    ///
    /// Returns the amount sent; zero if there was nothing to withdraw.
    ///
    /// # Errors
    /// Returns [`PlasmaError::TransferFailed`] if the transfer fails, with
    /// the balance restored.
    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Decimal> {
        let owner = ctx.caller;
        let amount = self.ledger.withdraw(owner, transfer).inspect_err(|err| {
            tracing::warn!(owner = %owner, error = %err, "Withdrawal rolled back");
        })?;
        if amount.is_zero() {
            return Ok(amount);
        }

        self.solvency.record_payout(amount);
        tracing::info!(owner = %owner, amount = %amount, "Balance withdrawn");
        self.events.push(ExitEvent::Withdrawn { owner, amount });
        Ok(amount)
    }

    // =================================================================
    // Read-only accessors
    // =================================================================

    #[must_use]
    pub fn config(&self) -> &ExitGameConfig {
        &self.config
    }

    #[must_use]
    pub fn child_block(&self, block: BlockNumber) -> Option<&ChildBlock> {
        self.child_blocks.get(&block)
    }

    /// The number the next submitted child block will receive.
    #[must_use]
    pub fn current_child_block(&self) -> BlockNumber {
        self.next_block
    }

    #[must_use]
    pub fn deposit_record(&self, nonce: DepositNonce) -> Option<&Deposit> {
        self.deposits.get(&nonce)
    }

    /// Number of deposits made so far.
    #[must_use]
    pub fn deposit_count(&self) -> usize {
        self.deposits.len()
    }

    /// The UTXO exit at `priority`, in whatever state it is.
    #[must_use]
    pub fn exit(&self, priority: Priority) -> Option<&Exit> {
        self.utxo_exits.get(&priority)
    }

    #[must_use]
    pub fn deposit_exit(&self, nonce: DepositNonce) -> Option<&Exit> {
        self.deposit_exits.get(&nonce)
    }

    #[must_use]
    pub fn balance_of(&self, owner: Address) -> Decimal {
        self.ledger.balance_of(owner)
    }

    #[must_use]
    pub fn total_withdraw_balance(&self) -> Decimal {
        self.ledger.total_withdrawable()
    }

    #[must_use]
    pub fn held_collateral(&self) -> Decimal {
        self.ledger.held_collateral()
    }

    /// UTXO exit keys still waiting in the queue.
    #[must_use]
    pub fn exit_queue_len(&self) -> usize {
        self.utxo_exits.queued()
    }

    #[must_use]
    pub fn deposit_exit_queue_len(&self) -> usize {
        self.deposit_exits.queued()
    }

    /// Bonds currently held by PENDING exits of both kinds.
    #[must_use]
    pub fn pending_bonds(&self) -> Decimal {
        self.utxo_exits.pending_bonds() + self.deposit_exits.pending_bonds()
    }

    /// Events emitted so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[ExitEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<ExitEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check the collateral bookkeeping.
    ///
    /// # Errors
    /// Returns [`PlasmaError::SolvencyViolation`] if any invariant fails.
    pub fn verify_solvency(&self) -> Result<()> {
        self.solvency.verify(&self.ledger, self.pending_bonds())
    }

    pub(crate) fn lock(&mut self, amount: Decimal) {
        self.ledger.lock(amount);
        self.solvency.record_lock(amount);
    }
}
