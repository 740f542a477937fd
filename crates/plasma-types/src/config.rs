//! Configuration for a root-ledger exit game deployment.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, Address, PlasmaError, Priority, Result, UtxoPosition};

/// Parameters fixed at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitGameConfig {
    /// The only address allowed to commit child blocks.
    pub operator: Address,
    /// Minimum bond attached to every exit; this much is retained per exit.
    pub min_exit_bond: Decimal,
    /// Age (seconds) an exit must reach before it can be finalized.
    pub maturity_secs: i64,
    /// Priority multiplier for the block number.
    pub block_index_factor: u128,
    /// Priority multiplier for the transaction index.
    pub tx_index_factor: u128,
}

impl Default for ExitGameConfig {
    fn default() -> Self {
        Self {
            operator: Address::ZERO,
            min_exit_bond: Decimal::new(constants::DEFAULT_MIN_EXIT_BOND, 0),
            maturity_secs: constants::EXIT_MATURITY_SECS,
            block_index_factor: constants::BLOCK_INDEX_FACTOR,
            tx_index_factor: constants::TX_INDEX_FACTOR,
        }
    }
}

impl ExitGameConfig {
    /// Default parameters with the given operator.
    #[must_use]
    pub fn with_operator(operator: Address) -> Self {
        Self {
            operator,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlasmaError::Configuration(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject parameter sets that would break priority ordering or payouts.
    pub fn validate(&self) -> Result<()> {
        if self.min_exit_bond.is_sign_negative() {
            return Err(PlasmaError::Configuration(
                "min_exit_bond must not be negative".to_string(),
            ));
        }
        if self.maturity_secs <= 0 {
            return Err(PlasmaError::Configuration(
                "maturity_secs must be positive".to_string(),
            ));
        }
        if chrono::Duration::try_seconds(self.maturity_secs).is_none() {
            return Err(PlasmaError::Configuration(format!(
                "maturity_secs ({}) is out of range",
                self.maturity_secs
            )));
        }
        // Two outputs per transaction must fit below one tx index step.
        if self.tx_index_factor < 2 {
            return Err(PlasmaError::Configuration(
                "tx_index_factor must be at least 2".to_string(),
            ));
        }
        if self.block_index_factor <= self.tx_index_factor {
            return Err(PlasmaError::Configuration(format!(
                "block_index_factor ({}) must exceed tx_index_factor ({})",
                self.block_index_factor, self.tx_index_factor
            )));
        }
        Ok(())
    }

    /// The maturity window as a duration.
    ///
    /// Saturates at [`chrono::Duration::MAX`] for values `validate` rejects.
    #[must_use]
    pub fn maturity(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.maturity_secs).unwrap_or(chrono::Duration::MAX)
    }

    /// Exit priority for a position under these factors.
    pub fn priority_of(&self, position: UtxoPosition) -> Result<Priority> {
        position.priority(self.block_index_factor, self.tx_index_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ExitGameConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.maturity(), chrono::Duration::weeks(1));
        assert_eq!(cfg.block_index_factor, 1_000_000_000);
        assert_eq!(cfg.tx_index_factor, 10_000);
    }

    #[test]
    fn priority_of_uses_configured_factors() {
        let cfg = ExitGameConfig {
            block_index_factor: 1000,
            tx_index_factor: 10,
            ..ExitGameConfig::default()
        };
        assert_eq!(
            cfg.priority_of(UtxoPosition::new(5, 2, 1)).unwrap(),
            Priority(5021)
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "operator": "0x0101010101010101010101010101010101010101", "maturity_secs": 60 }"#;
        let cfg = ExitGameConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.operator, Address::from_seed(1));
        assert_eq!(cfg.maturity_secs, 60);
        assert_eq!(cfg.min_exit_bond, Decimal::new(constants::DEFAULT_MIN_EXIT_BOND, 0));
    }

    #[test]
    fn invalid_factors_rejected() {
        let json = r#"{ "block_index_factor": 10, "tx_index_factor": 10 }"#;
        let err = ExitGameConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, PlasmaError::Configuration(_)));
    }

    #[test]
    fn non_positive_maturity_rejected() {
        let cfg = ExitGameConfig {
            maturity_secs: 0,
            ..ExitGameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_maturity_rejected() {
        let json = r#"{ "maturity_secs": 9223372036854775807 }"#;
        let err = ExitGameConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, PlasmaError::Configuration(_)));
        assert!(err.to_string().contains("out of range"));

        let cfg = ExitGameConfig {
            maturity_secs: i64::MAX,
            ..ExitGameConfig::default()
        };
        assert_eq!(cfg.maturity(), chrono::Duration::MAX);

        // Largest whole-second window chrono can represent is still accepted.
        let cfg = ExitGameConfig {
            maturity_secs: i64::MAX / 1000,
            ..ExitGameConfig::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = ExitGameConfig::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().starts_with("PL_ERR_900"));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = ExitGameConfig::with_operator(Address::from_seed(9));
        let json = serde_json::to_string(&cfg).unwrap();
        let back = ExitGameConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
