//! # plasma-types
//!
//! Shared types, errors, and configuration for the root-ledger **exit game**
//! of a two-layer value-transfer protocol.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`BlockNumber`], [`DepositNonce`], [`Priority`], [`UtxoPosition`]
//! - **Anchored records**: [`ChildBlock`], [`Deposit`]
//! - **Exit model**: [`Exit`], [`ExitState`]
//! - **Transaction model**: [`DecodedTransaction`], [`TxInput`], [`TxOutput`], [`Signature`], [`TxSignatures`]
//! - **Call environment**: [`CallContext`]
//! - **Notifications**: [`ExitEvent`]
//! - **Configuration**: [`ExitGameConfig`]
//! - **Errors**: [`PlasmaError`] with `PL_ERR_` prefix codes and [`ErrorCategory`]
//! - **Constants**: system-wide limits and defaults

pub mod block;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod event;
pub mod exit;
pub mod ids;
pub mod transaction;

pub use block::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use exit::*;
pub use ids::*;
pub use transaction::*;

// Constants are accessed via `plasma_types::constants::FOO`
// (not re-exported to avoid name collisions).
