//! One normalised numeric type for transaction amounts, fees, nonces and sequence numbers.
//!
//! Source requests mix decimal strings, bare integers and (occasionally) `0x`-hex in the same
//! field across chains. [`Amount`] accepts all three at the request boundary so every signer
//! downstream only ever sees a plain `u128`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// A non-negative integer amount, parsed once at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct Amount(u128);

impl Amount {
    /// The underlying value in the chain's smallest unit.
    pub fn value(self) -> u128 {
        self.0
    }

    /// Parse from a JSON value: a JSON number, a decimal string, or a `0x`-prefixed hex string.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map(|v| Amount(v as u128))
                .ok_or_else(|| Error::InvalidAmount(n.to_string())),
            Value::String(s) => Self::from_str(s),
            other => Err(Error::InvalidAmount(other.to_string())),
        }
    }

    /// Parse from a string: bare decimal digits or a `0x`-prefixed hex literal.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            u128::from_str_radix(hex, 16).map_err(|_| Error::InvalidAmount(s.to_string()))?
        } else {
            trimmed
                .parse::<u128>()
                .map_err(|_| Error::InvalidAmount(s.to_string()))?
        };
        Ok(Amount(parsed))
    }
}

impl TryFrom<Value> for Amount {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Amount::from_json(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_decimal() {
        assert_eq!(Amount::from_str("1000").unwrap().value(), 1000);
    }

    #[test]
    fn parses_hex() {
        assert_eq!(Amount::from_str("0xff").unwrap().value(), 255);
    }

    #[test]
    fn parses_json_number() {
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(Amount::from_json(&v).unwrap().value(), 42);
    }

    #[test]
    fn rejects_negative() {
        assert!(Amount::from_str("-5").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Amount::from_str("not-a-number").is_err());
    }
}
