//! Error types for the exit game.
//!
//! All errors use the `PL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Authorization (caller is not the recorded owner / operator)
//! - 2xx: Duplicate state (exit already exists)
//! - 3xx: Insufficient collateral (bond too small, payout not covered)
//! - 4xx: Proof validation (merkle membership, signatures)
//! - 5xx: Format (transaction decoding, position range)
//! - 6xx: Conflict (input mid-dispute, wrong exit state, position mismatch)
//! - 7xx: Value transfer
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, BlockNumber, DepositNonce, ExitState, UtxoPosition};

/// The failure class of a [`PlasmaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authorization,
    DuplicateState,
    InsufficientCollateral,
    ProofValidation,
    Format,
    Conflict,
    Transfer,
    Invariant,
    Internal,
}

/// Central error enum for all exit game operations.
///
/// Every variant is raised before any state is mutated, so an `Err` from a
/// public operation always means "nothing happened".
#[derive(Debug, Error)]
pub enum PlasmaError {
    // =================================================================
    // Authorization (1xx)
    // =================================================================
    /// The caller is not the owner recorded for the output or deposit.
    #[error("PL_ERR_100: Caller {caller} is not the owner {owner}")]
    NotOwner { caller: Address, owner: Address },

    /// Only the configured operator may commit child blocks.
    #[error("PL_ERR_101: Caller {caller} is not the operator")]
    NotOperator { caller: Address },

    /// No deposit exists under this nonce, so nobody owns it.
    #[error("PL_ERR_102: Unknown deposit: {0}")]
    UnknownDeposit(DepositNonce),

    // =================================================================
    // Duplicate state (2xx)
    // =================================================================
    /// An exit already exists under this key.
    #[error("PL_ERR_200: Exit already exists: {key}")]
    DuplicateExit { key: String },

    // =================================================================
    // Insufficient collateral (3xx)
    // =================================================================
    /// The value attached to the call is below the minimum exit bond.
    #[error("PL_ERR_300: Insufficient bond: posted {posted}, required {required}")]
    InsufficientBond { posted: Decimal, required: Decimal },

    /// Held collateral cannot cover the requested liability.
    #[error("PL_ERR_301: Collateral shortfall: need {needed}, held {held}")]
    CollateralShortfall { needed: Decimal, held: Decimal },

    /// Deposits must lock a positive amount.
    #[error("PL_ERR_302: Deposit value must be positive")]
    ZeroDeposit,

    // =================================================================
    // Proof validation (4xx)
    // =================================================================
    /// The merkle proof does not place the leaf under the committed root.
    #[error("PL_ERR_400: Merkle proof invalid for {position}")]
    InvalidMerkleProof { position: UtxoPosition },

    /// Input or confirmation signatures do not match the declared owners.
    #[error("PL_ERR_401: Transaction signatures invalid")]
    InvalidSignatures,

    /// The confirmation signature does not recover to the exit owner.
    #[error("PL_ERR_402: Confirmation signature does not recover to {owner}")]
    ConfirmationMismatch { owner: Address },

    /// No child block has been committed under this number.
    #[error("PL_ERR_403: Unknown child block: {0}")]
    UnknownBlock(BlockNumber),

    // =================================================================
    // Format (5xx)
    // =================================================================
    /// The raw transaction did not decode to the fixed 17-field layout.
    #[error("PL_ERR_500: Malformed transaction: {reason}")]
    MalformedTransaction { reason: String },

    /// The position cannot be mapped to an order-preserving priority.
    #[error("PL_ERR_501: Invalid position {position}: {reason}")]
    InvalidPosition {
        position: UtxoPosition,
        reason: String,
    },

    // =================================================================
    // Conflict (6xx)
    // =================================================================
    /// One of the transaction's inputs has an exit that is still pending.
    #[error("PL_ERR_600: Input {input} has a pending exit")]
    InputInDispute { input: String },

    /// The spending transaction does not reference the exited output.
    #[error("PL_ERR_601: Position mismatch: exit at {expected}, spend references {actual}")]
    PositionMismatch {
        expected: UtxoPosition,
        actual: UtxoPosition,
    },

    /// The deposit nonce is not an input of the spending transaction.
    #[error("PL_ERR_602: Deposit {0} is not spent by the challenging transaction")]
    DepositNotSpent(DepositNonce),

    /// No PENDING exit exists under this key.
    #[error("PL_ERR_603: No pending exit: {key}")]
    NoPendingExit { key: String },

    /// The exit state machine rejected a transition.
    #[error("PL_ERR_604: Invalid exit state transition: {from} -> {to}")]
    InvalidStateTransition { from: ExitState, to: ExitState },

    // =================================================================
    // Value transfer (7xx)
    // =================================================================
    /// The outbound transfer failed; the withdrawal was rolled back.
    #[error("PL_ERR_700: Transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: Address,
        amount: Decimal,
        reason: String,
    },

    // =================================================================
    // Invariants (8xx)
    // =================================================================
    /// Liabilities exceed held collateral, or the ledger is inconsistent.
    #[error("PL_ERR_800: Solvency invariant violation: {reason}")]
    SolvencyViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config file, bad factors, etc.).
    #[error("PL_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("PL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("PL_ERR_902: I/O error: {0}")]
    Io(String),
}

impl PlasmaError {
    /// The failure class this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner { .. } | Self::NotOperator { .. } | Self::UnknownDeposit(_) => {
                ErrorCategory::Authorization
            }
            Self::DuplicateExit { .. } => ErrorCategory::DuplicateState,
            Self::InsufficientBond { .. }
            | Self::CollateralShortfall { .. }
            | Self::ZeroDeposit => ErrorCategory::InsufficientCollateral,
            Self::InvalidMerkleProof { .. }
            | Self::InvalidSignatures
            | Self::ConfirmationMismatch { .. }
            | Self::UnknownBlock(_) => ErrorCategory::ProofValidation,
            Self::MalformedTransaction { .. } | Self::InvalidPosition { .. } => {
                ErrorCategory::Format
            }
            Self::InputInDispute { .. }
            | Self::PositionMismatch { .. }
            | Self::DepositNotSpent(_)
            | Self::NoPendingExit { .. }
            | Self::InvalidStateTransition { .. } => ErrorCategory::Conflict,
            Self::TransferFailed { .. } => ErrorCategory::Transfer,
            Self::SolvencyViolation { .. } => ErrorCategory::Invariant,
            Self::Configuration(_) | Self::Serialization(_) | Self::Io(_) => {
                ErrorCategory::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PlasmaError>;

impl From<std::io::Error> for PlasmaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PlasmaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = PlasmaError::UnknownBlock(BlockNumber(3));
        let msg = format!("{err}");
        assert!(msg.starts_with("PL_ERR_403"), "Got: {msg}");
        assert!(msg.contains("block:3"));
    }

    #[test]
    fn insufficient_bond_display() {
        let err = PlasmaError::InsufficientBond {
            posted: Decimal::new(10, 0),
            required: Decimal::new(25, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PL_ERR_300"));
        assert!(msg.contains("10"));
        assert!(msg.contains("25"));
    }

    #[test]
    fn state_transition_display() {
        let err = PlasmaError::InvalidStateTransition {
            from: ExitState::Finalized,
            to: ExitState::Challenged,
        };
        let msg = format!("{err}");
        assert!(msg.contains("FINALIZED"));
        assert!(msg.contains("CHALLENGED"));
    }

    #[test]
    fn categories_follow_code_groups() {
        let cases = [
            (
                PlasmaError::NotOperator {
                    caller: Address::ZERO,
                },
                ErrorCategory::Authorization,
            ),
            (
                PlasmaError::DuplicateExit { key: "x".into() },
                ErrorCategory::DuplicateState,
            ),
            (
                PlasmaError::CollateralShortfall {
                    needed: Decimal::ONE,
                    held: Decimal::ZERO,
                },
                ErrorCategory::InsufficientCollateral,
            ),
            (PlasmaError::InvalidSignatures, ErrorCategory::ProofValidation),
            (
                PlasmaError::MalformedTransaction { reason: "x".into() },
                ErrorCategory::Format,
            ),
            (
                PlasmaError::InputInDispute { input: "x".into() },
                ErrorCategory::Conflict,
            ),
        ];
        for (err, category) in cases {
            assert_eq!(err.category(), category, "{err}");
        }
    }

    #[test]
    fn all_errors_have_pl_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PlasmaError::InvalidSignatures),
            Box::new(PlasmaError::UnknownDeposit(DepositNonce(1))),
            Box::new(PlasmaError::Configuration("bad".into())),
            Box::new(PlasmaError::SolvencyViolation {
                reason: "test".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(msg.starts_with("PL_ERR_"), "Error missing PL_ERR_ prefix: {msg}");
        }
    }
}
