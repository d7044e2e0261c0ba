//! The request front-end: reads one [`cwk_model::request::Request`], dispatches it, and
//! produces the `Envelope`/`ErrorResponse` the worker binary writes to stdout/stderr.
//!
//! Nothing here touches stdin/stdout directly — [`handle_request`] is pure request in, response
//! out, so it can be exercised without a process boundary.

mod address;
mod error;

use serde_json::{json, Value};
use zeroize::Zeroize;

use cwk_keys::path::replace_last_segment;
use cwk_keys::{derive_ed25519, derive_secp256k1, generate_mnemonic, to_seed};
use cwk_model::request::{GetKeysBatch, Request, SignTransaction};
use cwk_model::response::{
    Envelope, GenerateMnemonic as GenerateMnemonicResponse, GetKeysBatch as GetKeysBatchResponse,
    KeyMaterial, KeyResult, SignTransaction as SignTransactionResponse,
    ValidateMnemonic as ValidateMnemonicResponse,
};
use cwk_registry::{Curve, Registry};
use cwk_signers::Dispatcher;

pub use crate::error::Error;

/// Handle one already-parsed request, returning the JSON value to print on success. Errors
/// propagate to the caller, who is responsible for the stderr envelope and exit code.
pub fn handle_request(registry: &Registry, request: Request) -> Result<Value, Error> {
    match request {
        Request::GenerateMnemonic(req) => {
            log::debug!("dispatching generate_mnemonic");
            let mnemonic = generate_mnemonic(&req.entropy)?;
            let body = GenerateMnemonicResponse {
                mnemonic: mnemonic.to_string(),
            };
            Ok(serde_json::to_value(Envelope::success(body))?)
        }
        Request::ValidateMnemonic(req) => {
            log::debug!("dispatching validate_mnemonic");
            let body = ValidateMnemonicResponse {
                is_valid: cwk_keys::validate_mnemonic(&req.mnemonic),
            };
            Ok(serde_json::to_value(Envelope::success(body))?)
        }
        Request::GetKeysBatch(req) => {
            log::debug!("dispatching get_keys_batch (num={})", req.num_or_default());
            let body = get_keys_batch(registry, &req)?;
            Ok(serde_json::to_value(Envelope::success(body))?)
        }
        Request::SignTransaction(req) => {
            log::debug!(
                "dispatching sign_transaction (coin='{}', method='{}')",
                req.asset.coin,
                req.method
            );
            let body = sign_transaction(registry, &req)?;
            Ok(serde_json::to_value(Envelope::success(body))?)
        }
    }
}

/// Derive batch key material for every dispatchable registry coin, in registry order (§4.2).
/// A secp256k1 coin derives once, at its registered canonical path. An ed25519 coin derives
/// `num` addresses, hardening the last path segment to each of `0..num` in turn — hardening the
/// final segment is mandatory for ed25519, never optional. A derivation failure for one coin (or
/// index) is captured in that slot rather than aborting the batch.
fn get_keys_batch(registry: &Registry, req: &GetKeysBatch) -> Result<GetKeysBatchResponse, Error> {
    let num = req.num_or_default();
    let mnemonic = cwk_keys::Mnemonic::parse_normalized(&req.mnemonic)
        .map_err(|e| Error::InputParseError(e.to_string()))?;
    let passphrase = req.passphrase.as_deref().unwrap_or("");
    let seed = to_seed(&mnemonic, passphrase);

    let mut results = Vec::new();
    for coin in registry.iterate() {
        let canonical = match coin.canonical_derivation() {
            Some(d) => d,
            None => continue,
        };
        match coin.curve {
            Curve::Secp256k1 => {
                results.push(derive_secp256k1(&seed, &canonical.path).map_or_else(
                    |e| KeyResult::Err { error: e.to_string() },
                    |material| {
                        let address =
                            address::derive_address(coin, &material.public_key().serialize());
                        match address {
                            Some(address) => KeyResult::Ok(KeyMaterial {
                                coin: coin.id.clone(),
                                address,
                                path: canonical.path.clone(),
                                extended_public_key: material.xpub_string(canonical.xpub_version),
                            }),
                            None => KeyResult::Err {
                                error: format!("no address algorithm for '{}'", coin.blockchain),
                            },
                        }
                    },
                ));
            }
            Curve::Ed25519 => {
                for index in 0..num {
                    let path = replace_last_segment(&canonical.path, index);
                    let entry = derive_ed25519(&seed, &path).map(|material| KeyMaterial {
                        coin: coin.id.clone(),
                        address: address::derive_address_ed25519(coin, material.public_key()),
                        path: path.clone(),
                        extended_public_key: String::new(),
                    });
                    results.push(match entry {
                        Ok(material) => KeyResult::Ok(material),
                        Err(e) => KeyResult::Err { error: e.to_string() },
                    });
                }
            }
        }
    }

    Ok(GetKeysBatchResponse { results })
}

/// The §4.5 pre-flight: resolve the coin, derive the signing key at the caller's path, check
/// the derived address against the caller's for secp256k1 coins, inject the private key into
/// `txData` under the field the signer expects, and dispatch.
fn sign_transaction(registry: &Registry, req: &SignTransaction) -> Result<SignTransactionResponse, Error> {
    let coin = registry.lookup(&req.asset.coin)?;

    let mnemonic = cwk_keys::Mnemonic::parse_normalized(&req.mnemonic)
        .map_err(|e| Error::InputParseError(e.to_string()))?;
    let passphrase = req.passphrase.as_deref().unwrap_or("");
    let seed = to_seed(&mnemonic, passphrase);

    let mut tx_data = req.tx_data.clone();

    match coin.curve {
        Curve::Secp256k1 => {
            let material = derive_secp256k1(&seed, &req.asset.derivation_path)?;
            if address::has_checked_address(&coin.blockchain) {
                let derived = address::derive_address(coin, &material.public_key().serialize());
                let matches = derived
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(&req.asset.address));
                if !matches {
                    return Err(Error::AddressMismatch);
                }
            }
            let mut private_key = *material.private_key();
            if coin.blockchain == "utxo" {
                let count = tx_data
                    .get("inputs")
                    .and_then(Value::as_array)
                    .map(|a| a.len())
                    .unwrap_or(0);
                let hex_key = hex::encode(private_key);
                tx_data["privateKeys"] = json!(vec![hex_key; count]);
            } else {
                tx_data["privateKey"] = json!(hex::encode(private_key));
            }
            private_key.zeroize();
        }
        Curve::Ed25519 => {
            // Address correctness for ed25519 families is delegated to the controller (§4.5
            // step 3): no attested crate covers their encodings end to end.
            let material = derive_ed25519(&seed, &req.asset.derivation_path)?;
            let mut private_key = *material.private_key();
            tx_data["privateKey"] = json!(hex::encode(private_key));
            private_key.zeroize();
        }
    }
    tx_data["fromAddress"] = json!(req.asset.address);

    let dispatcher = Dispatcher::new(registry);
    let output = dispatcher.sign(&req.asset.coin, &req.method, &tx_data)?;
    Ok(SignTransactionResponse {
        encoded: output.encoded,
        extend: output.extend,
    })
}
