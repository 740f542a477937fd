//! Per-operation environment supplied by the enclosing ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Address;

/// Who is calling, how much value is attached, and the ledger time.
///
/// `now` is coarse and only guaranteed non-decreasing across calls; nothing
/// in the exit game relies on sub-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    pub value: Decimal,
    pub now: DateTime<Utc>,
}

impl CallContext {
    /// A call with no attached value.
    #[must_use]
    pub fn new(caller: Address, now: DateTime<Utc>) -> Self {
        Self {
            caller,
            value: Decimal::ZERO,
            now,
        }
    }

    /// The same call with `value` attached.
    #[must_use]
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }
}
