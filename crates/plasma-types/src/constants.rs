//! System-wide constants for the exit game.

/// Multiplier applied to the block number when deriving an exit priority.
pub const BLOCK_INDEX_FACTOR: u128 = 1_000_000_000;

/// Multiplier applied to the transaction index when deriving an exit priority.
pub const TX_INDEX_FACTOR: u128 = 10_000;

/// Default minimum bond posted with every exit, in base units.
pub const DEFAULT_MIN_EXIT_BOND: i64 = 1_234_567_890;

/// Age an exit must reach before it can be finalized (one week).
pub const EXIT_MATURITY_SECS: i64 = 7 * 24 * 60 * 60;

/// Number of fields in a decoded child transaction.
pub const TX_FIELD_COUNT: usize = 17;

/// Number of inputs (and outputs) per child transaction.
pub const TX_SLOTS: usize = 2;

/// Depth of the child block merkle tree.
pub const MERKLE_DEPTH: usize = 16;

/// Size in bytes of a recoverable signature: public key (32) + signature (64).
pub const SIGNATURE_LEN: usize = 96;
