//! Data models of every request the worker accepts on standard input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single JSON document read from standard input, tagged by `command`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Generate a BIP-39 mnemonic from hex-encoded entropy.
    GenerateMnemonic(GenerateMnemonic),

    /// Validate a BIP-39 mnemonic's word list and checksum.
    ValidateMnemonic(ValidateMnemonic),

    /// Derive a batch of addresses/xpubs, one set per registry coin.
    GetKeysBatch(GetKeysBatch),

    /// Derive a key and sign a chain-specific transaction description.
    SignTransaction(SignTransaction),
}

/// Request for [`Request::GenerateMnemonic`].
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateMnemonic {
    /// Hex-encoded entropy, 16/20/24/28/32 bytes (case-insensitive, `0x` prefix optional).
    pub entropy: String,

    /// Passphrase bound to any subsequent seed derivation (BIP-39 "25th word").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

/// Request for [`Request::ValidateMnemonic`].
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ValidateMnemonic {
    /// The mnemonic phrase to validate.
    pub mnemonic: String,
}

/// Request for [`Request::GetKeysBatch`].
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetKeysBatch {
    /// The BIP-39 mnemonic phrase.
    pub mnemonic: String,

    /// Passphrase bound to seed derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,

    /// Number of ed25519 hardened indices to derive per ed25519 coin. Defaults to 50.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
}

impl GetKeysBatch {
    /// `num`, defaulted per §4.5 of the spec.
    pub fn num_or_default(&self) -> u32 {
        self.num.unwrap_or(50)
    }
}

/// Request for [`Request::SignTransaction`].
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SignTransaction {
    /// Name of the signer method to invoke, e.g. `signTransfer`, `signTokenTransfer`.
    pub method: String,

    /// The BIP-39 mnemonic phrase.
    pub mnemonic: String,

    /// Passphrase bound to seed derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,

    /// The asset/account context the caller believes it is signing from.
    pub asset: AssetContext,

    /// Chain-specific transaction description. Each signer owns the strongly-typed shape it
    /// expects and deserializes it from this raw value, so that field-presence rules live next to
    /// the signer that enforces them rather than in one shared struct.
    #[serde(rename = "txData")]
    pub tx_data: Value,
}

/// Identifies which coin, address and path the caller believes it is signing for.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetContext {
    /// Registry coin id, e.g. `bitcoin`, `ethereum`, `cosmoshub`.
    pub coin: String,

    /// The address the caller expects the derived key to control.
    pub address: String,

    /// The derivation path the caller expects was used to reach `address`.
    pub derivation_path: String,
}
