//! One normalised byte-string type for hashes, block references and opaque payloads.
//!
//! Source requests mix `0x`-prefixed hex and bare hex for the same kind of field across chains
//! (a Polkadot `genesisHash` vs. an EVM `data` field). [`ByteString`] accepts both at the request
//! boundary so every signer downstream only ever sees `&[u8]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// Raw bytes parsed once from a hex-ish request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct ByteString(Vec<u8>);

impl ByteString {
    /// The decoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse from a JSON value: must be a string, `0x`-prefixed or bare hex.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Self::from_str(s),
            other => Err(Error::InvalidByteString(other.to_string())),
        }
    }

    /// Parse from a string: `0x`-prefixed or bare hex, an even number of hex digits.
    pub fn from_str(s: &str) -> Result<Self, Error> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex.is_empty() {
            return Ok(ByteString(Vec::new()));
        }
        let bytes = hex::decode(hex).map_err(|_| Error::InvalidByteString(s.to_string()))?;
        Ok(ByteString(bytes))
    }

    /// Render as a `0x`-prefixed lowercase hex string.
    pub fn to_hex_0x(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Value> for ByteString {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ByteString::from_json(&value)
    }
}

impl From<ByteString> for String {
    fn from(b: ByteString) -> Self {
        b.to_hex_0x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_0x_prefixed() {
        assert_eq!(ByteString::from_str("0xdeadbeef").unwrap().as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_bare_hex() {
        assert_eq!(ByteString::from_str("deadbeef").unwrap().as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn roundtrips_through_hex_0x() {
        let b = ByteString::from_str("0x0102").unwrap();
        assert_eq!(b.to_hex_0x(), "0x0102");
    }

    #[test]
    fn rejects_odd_length() {
        assert!(ByteString::from_str("abc").is_err());
    }

    #[test]
    fn empty_string_is_empty_bytes() {
        assert!(ByteString::from_str("0x").unwrap().as_bytes().is_empty());
    }
}
