use cwk_common::{Amount, ByteString};
use serde_json::Value;

use crate::Error;

/// Fetch a required string field from `txData`, raising `InputInvalid` if absent or not a string.
pub fn field_str<'a>(data: &'a Value, name: &str) -> Result<&'a str, Error> {
    data.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InputInvalid(format!("missing or non-string field '{name}'")))
}

/// Fetch an optional string field, defaulting to `None` when absent.
pub fn field_str_opt<'a>(data: &'a Value, name: &str) -> Option<&'a str> {
    data.get(name).and_then(Value::as_str)
}

/// Fetch a required amount field (decimal string, `0x`-hex, or JSON number).
pub fn field_amount(data: &Value, name: &str) -> Result<Amount, Error> {
    let value = data
        .get(name)
        .ok_or_else(|| Error::InputInvalid(format!("missing field '{name}'")))?;
    Ok(Amount::from_json(value)?)
}

/// Fetch an optional amount field.
pub fn field_amount_opt(data: &Value, name: &str) -> Result<Option<Amount>, Error> {
    match data.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => Ok(Some(Amount::from_json(v)?)),
    }
}

/// Fetch a required hex byte-string field.
pub fn field_bytes(data: &Value, name: &str) -> Result<ByteString, Error> {
    let value = data
        .get(name)
        .ok_or_else(|| Error::InputInvalid(format!("missing field '{name}'")))?;
    Ok(ByteString::from_json(value)?)
}

/// Fetch a required u64 field, accepting JSON numbers or decimal strings.
pub fn field_u64(data: &Value, name: &str) -> Result<u64, Error> {
    match data.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| Error::InputInvalid(format!("field '{name}' out of range"))),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| Error::InputInvalid(format!("field '{name}' is not a number"))),
        _ => Err(Error::InputInvalid(format!("missing field '{name}'"))),
    }
}

/// Fetch a required boolean field, defaulting to `false` when absent.
pub fn field_bool(data: &Value, name: &str) -> bool {
    data.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// Fetch the `privateKey` field injected by the front-end as 32 raw bytes.
pub fn private_key_bytes(data: &Value) -> Result<[u8; 32], Error> {
    let hex_str = field_str(data, "privateKey")?;
    let bytes = ByteString::from_str(hex_str)?;
    let bytes = bytes.as_bytes();
    if bytes.len() != 32 {
        return Err(Error::InputInvalid(
            "privateKey must be 32 bytes".to_string(),
        ));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Fetch the `privateKeys` array field injected by the front-end for UTXO-family inputs.
pub fn private_keys_bytes(data: &Value) -> Result<Vec<[u8; 32]>, Error> {
    let arr = data
        .get("privateKeys")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InputInvalid("missing field 'privateKeys'".to_string()))?;
    arr.iter()
        .map(|v| {
            let s = v
                .as_str()
                .ok_or_else(|| Error::InputInvalid("privateKeys entries must be hex".to_string()))?;
            let bytes = ByteString::from_str(s)?;
            let bytes = bytes.as_bytes();
            if bytes.len() != 32 {
                return Err(Error::InputInvalid(
                    "privateKeys entries must be 32 bytes".to_string(),
                ));
            }
            let mut out = [0u8; 32];
            out.copy_from_slice(bytes);
            Ok(out)
        })
        .collect()
}
