//! Raw transaction bytes → fixed 17-field [`DecodedTransaction`].
//!
//! The wire form is a JSON array of exactly 17 elements:
//!
//! ```text
//! [ blk0, tx0, out0, nonce0, amount0, confirm0,
//!   blk1, tx1, out1, nonce1, amount1, confirm1,
//!   owner0, outAmount0, owner1, outAmount1, fee ]
//! ```
//!
//! Integers are JSON numbers. Amounts are decimal strings (numbers are also
//! accepted). Addresses and signatures are `0x` hex strings; `"0x"` is an
//! absent signature.

use std::str::FromStr;

use plasma_types::constants::{TX_FIELD_COUNT, TX_SLOTS};
use plasma_types::{
    Address, DecodedTransaction, DepositNonce, PlasmaError, Result, Signature, TxInput, TxOutput,
    UtxoPosition,
};
use rust_decimal::Decimal;
use serde_json::Value;

/// Fields per input slot.
const INPUT_FIELDS: usize = 6;

/// Offset of the first output field.
const OUTPUTS_OFFSET: usize = INPUT_FIELDS * TX_SLOTS;

/// Decodes raw transaction bytes into the fixed field layout.
pub trait TransactionDecoder {
    /// # Errors
    /// Returns [`PlasmaError::MalformedTransaction`] if the bytes do not
    /// decode to exactly 17 well-typed fields.
    fn decode(&self, tx_bytes: &[u8]) -> Result<DecodedTransaction>;
}

/// Decoder for the JSON-array wire form.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransactionDecoder;

impl TransactionDecoder for JsonTransactionDecoder {
    fn decode(&self, tx_bytes: &[u8]) -> Result<DecodedTransaction> {
        let value: Value =
            serde_json::from_slice(tx_bytes).map_err(|e| PlasmaError::MalformedTransaction {
                reason: format!("not JSON: {e}"),
            })?;
        let fields = value
            .as_array()
            .ok_or_else(|| malformed("transaction must be a JSON array"))?;
        if fields.len() != TX_FIELD_COUNT {
            return Err(malformed(&format!(
                "expected {TX_FIELD_COUNT} fields, got {}",
                fields.len()
            )));
        }

        let input = |slot: usize| -> Result<TxInput> {
            let base = slot * INPUT_FIELDS;
            Ok(TxInput {
                position: UtxoPosition::new(
                    uint(&fields[base], base)?,
                    uint(&fields[base + 1], base + 1)?,
                    uint(&fields[base + 2], base + 2)?,
                ),
                deposit_nonce: DepositNonce(uint(&fields[base + 3], base + 3)?),
                amount: amount(&fields[base + 4], base + 4)?,
                confirm_sig: signature(&fields[base + 5], base + 5)?,
            })
        };
        let output = |slot: usize| -> Result<TxOutput> {
            let base = OUTPUTS_OFFSET + slot * 2;
            Ok(TxOutput {
                owner: address(&fields[base], base)?,
                amount: amount(&fields[base + 1], base + 1)?,
            })
        };

        Ok(DecodedTransaction {
            inputs: [input(0)?, input(1)?],
            outputs: [output(0)?, output(1)?],
            fee: amount(&fields[TX_FIELD_COUNT - 1], TX_FIELD_COUNT - 1)?,
        })
    }
}

impl JsonTransactionDecoder {
    /// Encode a transaction into the wire form [`decode`](TransactionDecoder::decode) accepts.
    #[must_use]
    pub fn encode(tx: &DecodedTransaction) -> Vec<u8> {
        let mut fields: Vec<Value> = Vec::with_capacity(TX_FIELD_COUNT);
        for input in &tx.inputs {
            fields.push(input.position.block.into());
            fields.push(input.position.tx_index.into());
            fields.push(input.position.output_index.into());
            fields.push(input.deposit_nonce.0.into());
            fields.push(input.amount.to_string().into());
            fields.push(encode_signature(&input.confirm_sig).into());
        }
        for output in &tx.outputs {
            fields.push(output.owner.to_string().into());
            fields.push(output.amount.to_string().into());
        }
        fields.push(tx.fee.to_string().into());
        Value::Array(fields).to_string().into_bytes()
    }
}

fn malformed(reason: &str) -> PlasmaError {
    PlasmaError::MalformedTransaction {
        reason: reason.to_string(),
    }
}

fn uint(value: &Value, index: usize) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| malformed(&format!("field {index} must be an unsigned integer")))
}

fn amount(value: &Value, index: usize) -> Result<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    match parsed {
        Some(d) if !d.is_sign_negative() => Ok(d),
        Some(_) => Err(malformed(&format!("field {index} must not be negative"))),
        None => Err(malformed(&format!("field {index} must be a decimal amount"))),
    }
}

fn address(value: &Value, index: usize) -> Result<Address> {
    value
        .as_str()
        .ok_or_else(|| malformed(&format!("field {index} must be a hex address")))?
        .parse()
}

fn signature(value: &Value, index: usize) -> Result<Signature> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed(&format!("field {index} must be a hex signature")))?;
    if text.is_empty() || text == "0x" {
        return Ok(Signature::EMPTY);
    }
    text.parse()
}

fn encode_signature(sig: &Signature) -> String {
    if sig.is_empty() {
        "0x".to_string()
    } else {
        sig.to_string()
    }
}
