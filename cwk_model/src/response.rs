//! Data models of every response the worker writes on success or failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wraps a successful response body with the `"status":"success"` envelope field.
///
/// Written once, to standard output, as the worker's last action.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct Envelope<T> {
    /// Always `"success"`.
    pub status: String,

    /// The command-specific payload, flattened into the same JSON object.
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    /// Wrap `body` in a success envelope.
    pub fn success(body: T) -> Self {
        Envelope {
            status: "success".to_string(),
            body,
        }
    }
}

/// Response body for `generate_mnemonic`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateMnemonic {
    /// The generated BIP-39 mnemonic.
    pub mnemonic: String,
}

/// Response body for `validate_mnemonic`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ValidateMnemonic {
    /// Whether the mnemonic's word list and checksum are valid.
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}

/// Response body for `get_keys_batch`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetKeysBatch {
    /// One entry per non-denied, (if set) allow-listed registry coin, in registry order.
    pub results: Vec<KeyResult>,
}

/// One slot of a [`GetKeysBatch`] result: either derived key material, or a captured per-coin
/// failure that did not abort the batch.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum KeyResult {
    /// Successful derivation.
    Ok(KeyMaterial),

    /// The per-coin derivation failed; the batch continues without this entry's data.
    Err {
        /// The underlying failure message. Never contains key material.
        error: String,
    },
}

/// Derived public key material for one registry coin.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeyMaterial {
    /// Registry coin id.
    pub coin: String,

    /// The canonical receiving address for this coin.
    pub address: String,

    /// The derivation path used, with the last segment hardened for ed25519 coins.
    pub path: String,

    /// Serialized extended public key (`xpub`/`ypub`/`zpub`/…); empty string for ed25519 coins.
    #[serde(rename = "extendedPublicKey")]
    pub extended_public_key: String,
}

/// Response body for `sign_transaction`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SignTransaction {
    /// The broadcast-ready, chain-specific encoded payload.
    pub encoded: String,

    /// Diagnostic, non-secret fields specific to the chain/method (e.g. `r`, `s`, `v`, `txId`).
    pub extend: Value,
}

/// The single JSON document written to standard error on failure, with a non-zero exit code.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,

    /// The `command` tag of the request that failed, if one could be determined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Human-readable error message. Never contains key material.
    pub message: String,

    /// The error taxonomy variant name (`UnknownCoin`, `AddressMismatch`, …), used by the
    /// controller to branch without string-matching `message`.
    pub stack: String,
}
