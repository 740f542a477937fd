//! Starting and challenging exits.
//!
//! ## Validation order
//!
//! `start_exit` checks, in order: transaction format, position range,
//! output ownership, bond, signatures, merkle inclusion, input conflicts,
//! then duplicates. Challenges check the exit state first, then the
//! spend link, the confirmation signature and merkle inclusion.
//!
//! Nothing is written until every check has passed. The attached value is
//! only locked on success, so a rejected call keeps none of it.

use plasma_proofs::{ProofVerifier, TransactionDecoder, confirmation_hash, merkle_hash, tx_hash};
use plasma_types::{
    Address, BlockNumber, CallContext, DecodedTransaction, DepositNonce, Exit, ExitEvent, ExitState,
    Hash32, PlasmaError, Priority, Result, Signature, TxSignatures, UtxoPosition,
};
use rust_decimal::Decimal;

use crate::root_chain::RootChain;

/// Everything needed to exit one output of a committed transaction.
#[derive(Debug, Clone)]
pub struct StartExitRequest {
    /// Position of the output being exited.
    pub position: UtxoPosition,
    /// Raw bytes of the transaction that created the output.
    pub tx_bytes: Vec<u8>,
    /// Merkle inclusion proof of the transaction in its block.
    pub proof: Vec<u8>,
    /// Input and confirmation signatures of the transaction.
    pub sigs: TxSignatures,
    /// Owners of the transaction's inputs; zero for an absent input.
    pub input_owners: [Address; 2],
}

/// A committed transaction that spends an exited output or deposit,
/// confirmed by the exit's owner.
#[derive(Debug, Clone)]
pub struct ChallengeRequest {
    /// Position of the spending transaction (its output index is ignored).
    pub spend_position: UtxoPosition,
    pub tx_bytes: Vec<u8>,
    pub sigs: TxSignatures,
    pub proof: Vec<u8>,
    /// The exit owner's signature over the spending transaction's
    /// confirmation hash.
    pub confirmation_sig: Signature,
}

impl<V: ProofVerifier, D: TransactionDecoder> RootChain<V, D> {
    // =================================================================
    // Start
    // =================================================================

    /// Start an exit for a committed child-ledger output.
    ///
    /// The attached value must cover the minimum exit bond; the bond is
    /// retained with the exit and any excess is credited straight back to
    /// the caller.
    pub fn start_exit(&mut self, ctx: &CallContext, req: &StartExitRequest) -> Result<Priority> {
        let (priority, exit) = self.validate_start_exit(ctx, req).inspect_err(|err| {
            tracing::warn!(
                caller = %ctx.caller,
                position = %req.position,
                error = %err,
                "Exit rejected"
            );
        })?;

        let event = ExitEvent::ExitStarted {
            priority,
            owner: exit.owner,
            amount: exit.amount,
            utxo_pos: exit.utxo_pos,
        };
        self.utxo_exits.insert(priority, exit)?;
        self.settle_bond(ctx);

        tracing::info!(
            priority = %priority,
            caller = %ctx.caller,
            position = %req.position,
            "Exit started"
        );
        self.events.push(event);
        Ok(priority)
    }

    fn validate_start_exit(
        &self,
        ctx: &CallContext,
        req: &StartExitRequest,
    ) -> Result<(Priority, Exit)> {
        let tx = self.decoder.decode(&req.tx_bytes)?;
        let priority = self.config.priority_of(req.position)?;

        let output = tx.output(req.position)?;
        if ctx.caller != output.owner {
            return Err(PlasmaError::NotOwner {
                caller: ctx.caller,
                owner: output.owner,
            });
        }

        self.check_bond(ctx)?;

        let root = self.block_root(req.position)?;
        let hash = tx_hash(&req.tx_bytes);
        let [owner0, owner1] = req.input_owners;
        let owners_match_inputs = tx
            .inputs
            .iter()
            .zip(req.input_owners)
            .all(|(input, owner)| input.is_present() != owner.is_zero());
        if !owners_match_inputs
            || !self
                .verifier
                .check_sigs(&hash, &root, owner0, owner1, &req.sigs)
        {
            return Err(PlasmaError::InvalidSignatures);
        }

        let leaf = merkle_hash(&hash, &req.sigs);
        if !self
            .verifier
            .check_membership(&leaf, req.position.tx_index, &root, &req.proof)
        {
            return Err(PlasmaError::InvalidMerkleProof {
                position: req.position,
            });
        }

        self.check_inputs_not_disputed(&tx)?;
        self.utxo_exits.ensure_vacant(&priority)?;

        let exit = Exit::pending(
            output.owner,
            output.amount,
            self.config.min_exit_bond,
            req.position,
            ctx.now,
        );
        Ok((priority, exit))
    }

    /// Start an exit that reclaims a deposit directly.
    pub fn start_deposit_exit(
        &mut self,
        ctx: &CallContext,
        nonce: DepositNonce,
    ) -> Result<DepositNonce> {
        let exit = self
            .validate_start_deposit_exit(ctx, nonce)
            .inspect_err(|err| {
                tracing::warn!(caller = %ctx.caller, nonce = nonce.0, error = %err, "Deposit exit rejected");
            })?;

        let (owner, amount) = (exit.owner, exit.amount);
        self.deposit_exits.insert(nonce, exit)?;
        self.settle_bond(ctx);

        tracing::info!(nonce = nonce.0, owner = %owner, amount = %amount, "Deposit exit started");
        self.events.push(ExitEvent::DepositExitStarted {
            nonce,
            owner,
            amount,
        });
        Ok(nonce)
    }

    fn validate_start_deposit_exit(&self, ctx: &CallContext, nonce: DepositNonce) -> Result<Exit> {
        let deposit = self
            .deposits
            .get(&nonce)
            .ok_or(PlasmaError::UnknownDeposit(nonce))?;
        if ctx.caller != deposit.owner {
            return Err(PlasmaError::NotOwner {
                caller: ctx.caller,
                owner: deposit.owner,
            });
        }
        self.deposit_exits.ensure_vacant(&nonce)?;
        self.check_bond(ctx)?;

        Ok(Exit::pending(
            deposit.owner,
            deposit.amount,
            self.config.min_exit_bond,
            UtxoPosition::ZERO,
            ctx.now,
        ))
    }

    // =================================================================
    // Challenge
    // =================================================================

    /// Prove the PENDING exit at `exiting` invalid by showing a committed
    /// transaction whose input `input_slot` spends it.
    ///
    /// The caller names the spending input slot rather than it being taken
    /// from the exited output's index, so a spend through either input of a
    /// two-input transaction is accepted.
    ///
    /// On success the exit's bond is credited to the caller.
    pub fn challenge_exit(
        &mut self,
        ctx: &CallContext,
        exiting: UtxoPosition,
        input_slot: usize,
        req: &ChallengeRequest,
    ) -> Result<Priority> {
        let (priority, bond) = self
            .validate_challenge_exit(exiting, input_slot, req)
            .inspect_err(|err| {
                tracing::warn!(
                    challenger = %ctx.caller,
                    position = %exiting,
                    error = %err,
                    "Challenge rejected"
                );
            })?;

        self.ledger.try_credit(ctx.caller, bond)?;
        self.utxo_exits.challenge(&priority)?;

        tracing::info!(
            priority = %priority,
            challenger = %ctx.caller,
            bond = %bond,
            "Exit challenged"
        );
        self.events.push(ExitEvent::ExitChallenged {
            priority,
            challenger: ctx.caller,
        });
        Ok(priority)
    }

    /// Prove the PENDING deposit exit for `nonce` invalid by showing a
    /// committed transaction that spends the deposit.
    pub fn challenge_deposit_exit(
        &mut self,
        ctx: &CallContext,
        nonce: DepositNonce,
        req: &ChallengeRequest,
    ) -> Result<DepositNonce> {
        let bond = self
            .validate_challenge_deposit_exit(nonce, req)
            .inspect_err(|err| {
                tracing::warn!(
                    challenger = %ctx.caller,
                    nonce = nonce.0,
                    error = %err,
                    "Deposit challenge rejected"
                );
            })?;

        self.ledger.try_credit(ctx.caller, bond)?;
        self.deposit_exits.challenge(&nonce)?;

        tracing::info!(nonce = nonce.0, challenger = %ctx.caller, bond = %bond, "Deposit exit challenged");
        self.events.push(ExitEvent::DepositExitChallenged {
            nonce,
            challenger: ctx.caller,
        });
        Ok(nonce)
    }

    fn validate_challenge_exit(
        &self,
        exiting: UtxoPosition,
        input_slot: usize,
        req: &ChallengeRequest,
    ) -> Result<(Priority, Decimal)> {
        let priority = self.config.priority_of(exiting)?;
        let exit = self.utxo_exits.pending(&priority)?;
        let tx = self.decoder.decode(&req.tx_bytes)?;
        let input = tx.input(input_slot)?;
        if input.position != exit.utxo_pos {
            return Err(PlasmaError::PositionMismatch {
                expected: exit.utxo_pos,
                actual: input.position,
            });
        }
        self.verify_spend(req, exit.owner)?;
        Ok((priority, exit.bond))
    }

    fn validate_challenge_deposit_exit(
        &self,
        nonce: DepositNonce,
        req: &ChallengeRequest,
    ) -> Result<Decimal> {
        let exit = self.deposit_exits.pending(&nonce)?;
        let tx = self.decoder.decode(&req.tx_bytes)?;
        if !tx.spends_deposit(nonce) {
            return Err(PlasmaError::DepositNotSpent(nonce));
        }
        self.verify_spend(req, exit.owner)?;
        Ok(exit.bond)
    }

    // =================================================================
    // Shared checks
    // =================================================================

    fn check_bond(&self, ctx: &CallContext) -> Result<()> {
        if ctx.value < self.config.min_exit_bond {
            return Err(PlasmaError::InsufficientBond {
                posted: ctx.value,
                required: self.config.min_exit_bond,
            });
        }
        Ok(())
    }

    /// Lock the attached value and hand back whatever exceeds the bond.
    fn settle_bond(&mut self, ctx: &CallContext) {
        self.lock(ctx.value);
        let excess = ctx.value - self.config.min_exit_bond;
        if excess > Decimal::ZERO {
            self.ledger.credit(ctx.caller, excess);
            tracing::debug!(caller = %ctx.caller, excess = %excess, "Excess bond credited");
        }
    }

    fn block_root(&self, position: UtxoPosition) -> Result<Hash32> {
        let block = BlockNumber(position.block);
        self.child_blocks
            .get(&block)
            .map(|b| b.merkle_root)
            .ok_or(PlasmaError::UnknownBlock(block))
    }

    /// An input may not be exited from while its own exit is PENDING.
    fn check_inputs_not_disputed(&self, tx: &DecodedTransaction) -> Result<()> {
        for input in tx.inputs.iter().filter(|i| i.is_present()) {
            let (state, label) = if input.spends_deposit() {
                (
                    self.deposit_exits.state(&input.deposit_nonce),
                    input.deposit_nonce.to_string(),
                )
            } else {
                let priority = self.config.priority_of(input.position)?;
                (self.utxo_exits.state(&priority), input.position.to_string())
            };
            if state == ExitState::Pending {
                return Err(PlasmaError::InputInDispute { input: label });
            }
        }
        Ok(())
    }

    /// The spending transaction is committed under its block root and the
    /// exit owner confirmed it.
    fn verify_spend(&self, req: &ChallengeRequest, owner: Address) -> Result<()> {
        let root = self.block_root(req.spend_position)?;
        let leaf = merkle_hash(&tx_hash(&req.tx_bytes), &req.sigs);

        let confirm = confirmation_hash(&leaf, &root);
        if self.verifier.recover(&confirm, &req.confirmation_sig) != Some(owner) {
            return Err(PlasmaError::ConfirmationMismatch { owner });
        }

        if !self.verifier.check_membership(
            &leaf,
            req.spend_position.tx_index,
            &root,
            &req.proof,
        ) {
            return Err(PlasmaError::InvalidMerkleProof {
                position: req.spend_position,
            });
        }
        Ok(())
    }
}
