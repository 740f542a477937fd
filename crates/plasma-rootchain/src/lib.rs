//! # plasma-rootchain
//!
//! **Exit game**: the root-ledger side of a two-layer value-transfer
//! protocol. An untrusted operator commits child blocks; users can always
//! leave with their funds by exiting, and anyone can prove an exit invalid
//! during its challenge window.
//!
//! ## Architecture
//!
//! [`RootChain`] owns all state and exposes every operation:
//! 1. **Anchoring**: `submit_block` (operator only) and `deposit`
//! 2. **Exits**: `start_exit`, `start_deposit_exit`, each bonded
//! 3. **Challenges**: `challenge_exit`, `challenge_deposit_exit`, paying
//!    the bond to the challenger
//! 4. **Finalization**: `finalize_exits`, `finalize_deposit_exits`,
//!    draining mature exits in priority order under a collateral guard
//! 5. **Withdrawals**: `withdraw`, pulling a credited balance out through
//!    a [`ValueTransfer`]
//!
//! Proof checking and transaction decoding are delegated to the
//! `plasma-proofs` traits.

pub mod balance_ledger;
pub mod exit_game;
pub mod exit_queue;
pub mod finalizer;
pub mod priority_queue;
pub mod root_chain;
pub mod solvency;
pub mod transfer;

pub use balance_ledger::BalanceLedger;
pub use exit_game::{ChallengeRequest, StartExitRequest};
pub use exit_queue::ExitQueue;
pub use finalizer::{FinalizeReport, FinalizeStop};
pub use priority_queue::PriorityQueue;
pub use root_chain::RootChain;
pub use solvency::SolvencyMonitor;
pub use transfer::{RecordingTransfer, ValueTransfer};
