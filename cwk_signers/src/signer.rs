use serde_json::Value;

use cwk_registry::Coin;

use crate::Error;

/// The result of a successful signing call: the broadcast-ready payload plus a diagnostic object.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignOutput {
    /// The broadcast-ready payload. Never empty on success.
    pub encoded: String,

    /// Chain-specific diagnostic fields (e.g. `{v, r, s}` for EVM), never secret material.
    pub extend: Value,
}

impl SignOutput {
    pub fn new(encoded: impl Into<String>, extend: Value) -> Self {
        SignOutput {
            encoded: encoded.into(),
            extend,
        }
    }
}

/// One chain-family signer. `tx_data` has already had the private key injected by the front-end
/// (§4.5 step 4) under `privateKey`, `privateKeys`, or `fromAddress`, depending on the family.
///
/// Implementations must run the validate → sign → validate pipeline of §4.4 and release any
/// owning handle to key material on every exit path, success or failure.
pub trait Signer {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error>;
}
