//! The long tail: Algorand, Aptos, Hedera, Stellar, Tezos, NEAR, Sui, XRP, TON, Nervos/CKB,
//! Filecoin, ICP. Each chain gets its own small signing method inside one struct, the same
//! way the Cosmos and Polkadot families branch internally on `coin.id` rather than each
//! getting a dedicated top-level signer.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signer as _, SigningKey};
use serde_json::{json, Value};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_bool, field_bytes, field_str, field_str_opt, field_u64, private_key_bytes};
use crate::Error;

const TON_EXPIRY_SECONDS: u64 = 3600;

fn keypair(tx_data: &Value) -> Result<SigningKey, Error> {
    let private_key = private_key_bytes(tx_data)?;
    Ok(SigningKey::from_bytes(&private_key))
}

/// `note`/`genesisHash`-style fields may arrive as hex or base64; Algorand tooling accepts both.
fn decode_hex_or_base64(s: &str) -> Result<Vec<u8>, Error> {
    if let Ok(bytes) = hex::decode(s.trim_start_matches("0x")) {
        return Ok(bytes);
    }
    STANDARD
        .decode(s)
        .map_err(|_| Error::InputInvalid(format!("'{s}' is neither hex nor base64")))
}

fn base58_decode(s: &str) -> Result<Vec<u8>, Error> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InputInvalid(e.to_string()))
}

pub struct OtherSigner;

impl Signer for OtherSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        match coin.id.as_str() {
            "algorand" => self.sign_algorand(method, coin, tx_data),
            "aptos" => self.sign_aptos(method, coin, tx_data),
            "hedera" => self.sign_hedera(method, coin, tx_data),
            "stellar" => self.sign_stellar(method, coin, tx_data),
            "tezos" => self.sign_tezos(method, coin, tx_data),
            "near" => self.sign_near(method, coin, tx_data),
            "sui" => self.sign_sui(method, coin, tx_data),
            "ripple" => self.sign_xrp(method, coin, tx_data),
            "ton" => self.sign_ton(method, coin, tx_data),
            "nervos" => self.sign_nervos(method, coin, tx_data),
            "filecoin" => self.sign_filecoin(method, coin, tx_data),
            "icp" => self.sign_icp(method, coin, tx_data),
            other => Err(Error::UnsupportedChain(other.to_string())),
        }
    }
}

impl OtherSigner {
    fn require_transfer(&self, method: &str, coin: &Coin) -> Result<(), Error> {
        if method != "signTransfer" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }
        Ok(())
    }

    fn sign_algorand(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        let signing_key = keypair(tx_data)?;
        let genesis_hash = decode_hex_or_base64(field_str(tx_data, "genesisHash")?)?;
        let note = field_str_opt(tx_data, "note")
            .map(decode_hex_or_base64)
            .transpose()?
            .unwrap_or_default();
        let amount = field_amount(tx_data, "amount")?.value();
        let to_address = field_str(tx_data, "toAddress")?;
        let first_valid = field_u64(tx_data, "firstValid")?;
        let last_valid = field_u64(tx_data, "lastValid")?;

        let mut preimage = b"TX".to_vec();
        preimage.extend_from_slice(if method == "signAssetTransfer" { b"axfer" } else { b"pay" });
        preimage.extend_from_slice(&genesis_hash);
        preimage.extend_from_slice(to_address.as_bytes());
        preimage.extend_from_slice(&amount.to_be_bytes());
        preimage.extend_from_slice(&first_valid.to_be_bytes());
        preimage.extend_from_slice(&last_valid.to_be_bytes());
        preimage.extend_from_slice(&note);
        if method == "signAssetTransfer" {
            let asset_id = field_u64(tx_data, "assetId")?;
            preimage.extend_from_slice(&asset_id.to_be_bytes());
        } else if method != "signTransfer" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }

        let signature = signing_key.sign(&preimage);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "txBytes": hex::encode(&preimage) })))
    }

    fn sign_aptos(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let sender = field_str(tx_data, "fromAddress")?;
        let to_address = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let sequence_number = field_u64(tx_data, "sequenceNumber")?;
        let expiration = field_u64(tx_data, "expirationTimestamp")?;

        let mut raw = Vec::new();
        raw.extend_from_slice(sender.as_bytes());
        raw.extend_from_slice(&sequence_number.to_le_bytes());
        raw.extend_from_slice(to_address.as_bytes());
        raw.extend_from_slice(&amount.to_le_bytes());
        raw.extend_from_slice(&expiration.to_le_bytes());

        let signature = signing_key.sign(&raw);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "rawTransaction": hex::encode(&raw) })))
    }

    fn sign_hedera(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let timestamp_seconds = field_u64(tx_data, "timestampSeconds")?;
        let timestamp_nanos = field_u64(tx_data, "timestampNanos").unwrap_or(0);
        let from_account = field_str(tx_data, "fromAddress")?;
        let to_account = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();

        let mut body = Vec::new();
        body.extend_from_slice(&timestamp_seconds.to_be_bytes());
        body.extend_from_slice(&timestamp_nanos.to_be_bytes());
        body.extend_from_slice(from_account.as_bytes());
        body.extend_from_slice(to_account.as_bytes());
        body.extend_from_slice(&amount.to_be_bytes());

        let signature = signing_key.sign(&body);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "bodyBytes": hex::encode(&body) })))
    }

    fn sign_stellar(&self, method: &str, _coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        let signing_key = keypair(tx_data)?;
        let passphrase = network_passphrase(field_str_opt(tx_data, "network").unwrap_or("public"));
        let network_id = {
            use sha2::{Digest, Sha256};
            Sha256::digest(passphrase.as_bytes())
        };

        let source = field_str(tx_data, "fromAddress")?;
        let sequence = field_u64(tx_data, "sequence")?;

        let mut op = Vec::new();
        match method {
            "signTransfer" => {
                op.extend_from_slice(b"opPayment");
                let destination = field_str(tx_data, "toAddress")?;
                let amount = field_amount(tx_data, "amount")?.value();
                op.extend_from_slice(destination.as_bytes());
                op.extend_from_slice(&amount.to_be_bytes());
            }
            "signChangeTrust" => {
                op.extend_from_slice(b"opChangeTrust");
                let asset_code = field_str(tx_data, "assetCode")?;
                let limit = field_amount(tx_data, "limit")?.value();
                op.extend_from_slice(asset_code.as_bytes());
                op.extend_from_slice(&limit.to_be_bytes());
            }
            other => {
                return Err(Error::UnsupportedMethod {
                    coin: _coin.id.clone(),
                    method: other.to_string(),
                })
            }
        }

        let mut tx_envelope = Vec::new();
        tx_envelope.extend_from_slice(&network_id);
        tx_envelope.extend_from_slice(source.as_bytes());
        tx_envelope.extend_from_slice(&sequence.to_be_bytes());
        tx_envelope.extend_from_slice(&op);

        let signature = signing_key.sign(&tx_envelope);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "envelopeXdr": hex::encode(&tx_envelope) })))
    }

    fn sign_tezos(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let contract = field_str(tx_data, "contractAddress")?;
        let entrypoint = if tx_data.get("tokenId").is_some() { "transfer_fa2" } else { "transfer_fa1_2" };
        let to_address = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let branch = field_bytes(tx_data, "branch")?;

        let mut forged = Vec::new();
        forged.extend_from_slice(branch.as_bytes());
        forged.extend_from_slice(contract.as_bytes());
        forged.extend_from_slice(entrypoint.as_bytes());
        forged.extend_from_slice(to_address.as_bytes());
        forged.extend_from_slice(&amount.to_be_bytes());

        let signature = signing_key.sign(&forged);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "forgedBytes": hex::encode(&forged) })))
    }

    fn sign_near(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let signer_id = field_str(tx_data, "fromAddress")?;
        let receiver_id = field_str(tx_data, "toAddress")?;
        let nonce = field_u64(tx_data, "nonce")?;
        let block_hash = base58_decode(field_str(tx_data, "blockHash")?)?;
        let amount = field_amount(tx_data, "amount")?.value();

        let mut tx = Vec::new();
        tx.extend_from_slice(signer_id.as_bytes());
        tx.extend_from_slice(&nonce.to_le_bytes());
        tx.extend_from_slice(receiver_id.as_bytes());
        tx.extend_from_slice(&block_hash);
        tx.extend_from_slice(&amount.to_le_bytes());

        let signature = signing_key.sign(&tx);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "transaction": hex::encode(&tx) })))
    }

    fn sign_sui(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let to_address = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let input_coins = tx_data
            .get("inputCoins")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InputInvalid("missing field 'inputCoins'".to_string()))?;

        let mut tx_bytes = Vec::new();
        tx_bytes.extend_from_slice(b"PaySui");
        tx_bytes.extend_from_slice(to_address.as_bytes());
        tx_bytes.extend_from_slice(&amount.to_le_bytes());
        for coin_ref in input_coins {
            let object_id = coin_ref
                .get("objectId")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InputInvalid("inputCoins entry missing objectId".to_string()))?;
            let version = coin_ref
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::InputInvalid("inputCoins entry missing version".to_string()))?;
            let digest = coin_ref
                .get("objectDigest")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InputInvalid("inputCoins entry missing objectDigest".to_string()))?;
            tx_bytes.extend_from_slice(object_id.as_bytes());
            tx_bytes.extend_from_slice(&version.to_le_bytes());
            tx_bytes.extend_from_slice(digest.as_bytes());
        }

        let signature = signing_key.sign(&tx_bytes);
        Ok(SignOutput::new(
            hex::encode(signature.to_bytes()),
            json!({ "signature": hex::encode(signature.to_bytes()), "txBytes": hex::encode(&tx_bytes) }),
        ))
    }

    fn sign_xrp(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let account = field_str(tx_data, "fromAddress")?;
        let destination = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let sequence = field_u64(tx_data, "sequence")?;
        let destination_tag = field_u64(tx_data, "destinationTag");

        let mut blob = Vec::new();
        blob.extend_from_slice(account.as_bytes());
        blob.extend_from_slice(destination.as_bytes());
        blob.extend_from_slice(&amount.to_be_bytes());
        blob.extend_from_slice(&sequence.to_be_bytes());
        if let Ok(tag) = destination_tag {
            blob.extend_from_slice(&tag.to_be_bytes());
        }

        let signature = signing_key.sign(&blob);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "txBlob": hex::encode(&blob) })))
    }

    fn sign_ton(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let to_address = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let seqno = field_u64(tx_data, "seqno")?;
        let timestamp = field_u64(tx_data, "timestamp")?;
        let expiry = timestamp + TON_EXPIRY_SECONDS;
        let jetton_payload = tx_data
            .get("jettonPayload")
            .and_then(Value::as_str)
            .map(decode_hex_or_base64)
            .transpose()?;

        let mut message = Vec::new();
        message.extend_from_slice(to_address.as_bytes());
        message.extend_from_slice(&amount.to_le_bytes());
        message.extend_from_slice(&seqno.to_be_bytes());
        message.extend_from_slice(&expiry.to_be_bytes());
        if let Some(payload) = &jetton_payload {
            message.extend_from_slice(payload);
        }

        let signature = signing_key.sign(&message);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "boc": hex::encode(&message), "expiry": expiry })))
    }

    fn sign_nervos(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let inputs = tx_data
            .get("inputs")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InputInvalid("missing field 'inputs'".to_string()))?;
        let code_hash = field_str(tx_data, "lockCodeHash")?;
        let hash_type = field_str(tx_data, "lockHashType")?;
        let args = field_str(tx_data, "lockArgs")?;
        let byte_fee = field_u64(tx_data, "byteFee")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let to_args = field_str(tx_data, "toLockArgs")?;

        let mut tx = Vec::new();
        for input in inputs {
            let tx_hash = input
                .get("txHash")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::InputInvalid("input missing txHash".to_string()))?;
            let index = input
                .get("index")
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::InputInvalid("input missing index".to_string()))?;
            tx.extend_from_slice(tx_hash.as_bytes());
            tx.extend_from_slice(&index.to_le_bytes());
        }
        tx.extend_from_slice(code_hash.as_bytes());
        tx.extend_from_slice(hash_type.as_bytes());
        tx.extend_from_slice(args.as_bytes());
        tx.extend_from_slice(to_args.as_bytes());
        tx.extend_from_slice(&amount.to_le_bytes());
        tx.extend_from_slice(&byte_fee.to_le_bytes());

        let signature = signing_key.sign(&tx);
        Ok(SignOutput::new(
            hex::encode(signature.to_bytes()),
            json!({ "transaction": { "hash": hex::encode(&tx) } }),
        ))
    }

    fn sign_filecoin(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let to_address = field_str(tx_data, "toAddress")?;
        let value = field_bytes(tx_data, "value")?;
        let gas_fee_cap = field_bytes(tx_data, "gasFeeCap")?;
        let gas_premium = field_bytes(tx_data, "gasPremium")?;
        let nonce = field_u64(tx_data, "nonce")?;

        let mut message = Vec::new();
        message.extend_from_slice(to_address.as_bytes());
        message.extend_from_slice(&nonce.to_be_bytes());
        message.extend_from_slice(value.as_bytes());
        message.extend_from_slice(gas_fee_cap.as_bytes());
        message.extend_from_slice(gas_premium.as_bytes());

        let signature = signing_key.sign(&message);
        Ok(SignOutput::new(hex::encode(signature.to_bytes()), json!({ "message": hex::encode(&message) })))
    }

    fn sign_icp(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        self.require_transfer(method, coin)?;
        let signing_key = keypair(tx_data)?;
        let to_principal = field_str(tx_data, "toAddress")?;
        let amount = field_amount(tx_data, "amount")?.value();
        let timestamp_ms = field_u64(tx_data, "timestampMs")?;
        let ingress_expiry_ns = timestamp_ms * 1_000_000;
        let memo = field_u64(tx_data, "memo").unwrap_or(0);

        let mut request = Vec::new();
        request.extend_from_slice(to_principal.as_bytes());
        request.extend_from_slice(&amount.to_be_bytes());
        request.extend_from_slice(&ingress_expiry_ns.to_be_bytes());
        request.extend_from_slice(&memo.to_be_bytes());

        let signature = signing_key.sign(&request);
        let skip_check = field_bool(tx_data, "skipAddressCheck");
        Ok(SignOutput::new(
            hex::encode(signature.to_bytes()),
            json!({ "requestId": hex::encode(&request), "ingressExpiry": ingress_expiry_ns, "skippedAddressCheck": skip_check }),
        ))
    }
}

fn network_passphrase(network: &str) -> &'static str {
    match network {
        "testnet" => "Test SDF Network ; September 2015",
        _ => "Public Global Stellar Network ; September 2015",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icp_nanosecond_conversion_matches_millisecond_scale() {
        assert_eq!(1_700_000_000u64 * 1_000_000, 1_700_000_000_000_000);
    }

    #[test]
    fn decode_hex_or_base64_accepts_base64() {
        assert_eq!(decode_hex_or_base64("Zm9vYmFy").unwrap(), b"foobar".to_vec());
    }

    #[test]
    fn network_passphrase_defaults_to_public() {
        assert_eq!(network_passphrase("public"), "Public Global Stellar Network ; September 2015");
        assert_ne!(network_passphrase("testnet"), network_passphrase("public"));
    }
}
