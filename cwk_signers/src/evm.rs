//! EVM family: Ethereum, BSC, Polygon, Avalanche and any other chain tagged `evm`. Legacy and
//! EIP-1559 transactions share an RLP envelope; only the fee fields and the trailing signature
//! layout differ.

use rlp::RlpStream;
use secp256k1::{Message, Secp256k1, SecretKey};
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_amount_opt, field_bytes, field_str, private_key_bytes};
use crate::Error;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// RLP-encodes a big-endian integer with leading zero bytes stripped, per EVM's "minimal length"
/// number encoding (a bare `0` encodes as the empty byte string).
fn rlp_append_amount(stream: &mut RlpStream, value: u128) {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|b| *b != 0);
    let trimmed: Vec<u8> = match first_nonzero {
        Some(idx) => bytes[idx..].to_vec(),
        None => Vec::new(),
    };
    stream.append(&trimmed);
}

fn erc20_transfer_data(to: &str, amount: u128) -> Result<Vec<u8>, Error> {
    let to_hex = to.trim_start_matches("0x");
    let to_bytes = hex::decode(to_hex)
        .map_err(|_| Error::InputInvalid("erc20 recipient is not a hex address".to_string()))?;
    if to_bytes.len() != 20 {
        return Err(Error::InputInvalid("erc20 recipient must be 20 bytes".to_string()));
    }
    let mut data = Vec::with_capacity(4 + 32 + 32);
    // keccak256("transfer(address,uint256)")[..4]
    data.extend_from_slice(&keccak256(b"transfer(address,uint256)")[..4]);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&to_bytes);
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&amount.to_be_bytes());
    Ok(data)
}

pub struct EvmSigner;

impl Signer for EvmSigner {
    fn sign(&self, method: &str, _coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        match method {
            "signTransfer" | "signTokenTransfer" => self.sign_transfer(tx_data),
            "signMessage" => self.sign_message(tx_data),
            other => Err(Error::UnsupportedMethod {
                coin: _coin.id.clone(),
                method: other.to_string(),
            }),
        }
    }
}

impl EvmSigner {
    fn sign_transfer(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let private_key = private_key_bytes(tx_data)?;
        let nonce = field_amount(tx_data, "nonce")?.value();
        let gas_limit = field_amount(tx_data, "gasLimit")?.value();
        let chain_id = field_amount(tx_data, "chainId")?.value();
        let amount = field_amount(tx_data, "amount")?.value();

        let max_fee = field_amount_opt(tx_data, "maxFeePerGas")?;
        let max_inclusion_fee = field_amount_opt(tx_data, "maxInclusionFeePerGas")?;
        let is_1559 = max_fee.is_some() || max_inclusion_fee.is_some();

        let token_contract = tx_data.get("tokenContract").and_then(Value::as_str);
        let (to, data) = match token_contract {
            Some(contract) => {
                let recipient = field_str(tx_data, "toAddress")?;
                (contract.to_string(), erc20_transfer_data(recipient, amount)?)
            }
            None => {
                let recipient = field_str(tx_data, "toAddress")?.to_string();
                let data = match tx_data.get("data") {
                    Some(v) if !v.is_null() => field_bytes(tx_data, "data")?.as_bytes().to_vec(),
                    _ => Vec::new(),
                };
                (recipient, data)
            }
        };
        let to_bytes = hex::decode(to.trim_start_matches("0x"))
            .map_err(|_| Error::InputInvalid("toAddress is not hex".to_string()))?;

        let value_for_tx = if token_contract.is_some() { 0 } else { amount };

        let mut stream = RlpStream::new();
        if is_1559 {
            let max_priority = max_inclusion_fee.map(|a| a.value()).unwrap_or(0);
            let max_fee_per_gas = max_fee.map(|a| a.value()).unwrap_or(max_priority);
            stream.begin_unbounded_list();
            rlp_append_amount(&mut stream, chain_id);
            rlp_append_amount(&mut stream, nonce);
            rlp_append_amount(&mut stream, max_priority);
            rlp_append_amount(&mut stream, max_fee_per_gas);
            rlp_append_amount(&mut stream, gas_limit);
            stream.append(&to_bytes);
            rlp_append_amount(&mut stream, value_for_tx);
            stream.append(&data);
            stream.begin_list(0); // empty access list
            stream.finalize_unbounded_list();

            let mut payload = vec![0x02u8];
            payload.extend_from_slice(&stream.out());
            let sighash = keccak256(&payload);
            let (r, s, recovery_id) = self.sign_digest(&private_key, &sighash)?;

            let mut sig_stream = RlpStream::new();
            sig_stream.begin_unbounded_list();
            rlp_append_amount(&mut sig_stream, chain_id);
            rlp_append_amount(&mut sig_stream, nonce);
            rlp_append_amount(&mut sig_stream, max_priority);
            rlp_append_amount(&mut sig_stream, max_fee_per_gas);
            rlp_append_amount(&mut sig_stream, gas_limit);
            sig_stream.append(&to_bytes);
            rlp_append_amount(&mut sig_stream, value_for_tx);
            sig_stream.append(&data);
            sig_stream.begin_list(0);
            sig_stream.append(&(recovery_id as u64));
            sig_stream.append(&r.to_vec());
            sig_stream.append(&s.to_vec());
            sig_stream.finalize_unbounded_list();

            let mut encoded = vec![0x02u8];
            encoded.extend_from_slice(&sig_stream.out());
            let v = recovery_id as u64;
            Ok(SignOutput::new(
                format!("0x{}", hex::encode(encoded)),
                json!({ "v": format!("0x{v:x}"), "r": hex::encode(r), "s": hex::encode(s) }),
            ))
        } else {
            let gas_price = field_amount(tx_data, "gasPrice")?.value();

            stream.begin_unbounded_list();
            rlp_append_amount(&mut stream, nonce);
            rlp_append_amount(&mut stream, gas_price);
            rlp_append_amount(&mut stream, gas_limit);
            stream.append(&to_bytes);
            rlp_append_amount(&mut stream, value_for_tx);
            stream.append(&data);
            rlp_append_amount(&mut stream, chain_id);
            stream.append(&0u8);
            stream.append(&0u8);
            stream.finalize_unbounded_list();

            let sighash = keccak256(&stream.out());
            let (r, s, recovery_id) = self.sign_digest(&private_key, &sighash)?;
            let v = chain_id * 2 + 35 + recovery_id as u128;

            let mut sig_stream = RlpStream::new();
            sig_stream.begin_unbounded_list();
            rlp_append_amount(&mut sig_stream, nonce);
            rlp_append_amount(&mut sig_stream, gas_price);
            rlp_append_amount(&mut sig_stream, gas_limit);
            sig_stream.append(&to_bytes);
            rlp_append_amount(&mut sig_stream, value_for_tx);
            sig_stream.append(&data);
            rlp_append_amount(&mut sig_stream, v);
            sig_stream.append(&r.to_vec());
            sig_stream.append(&s.to_vec());
            sig_stream.finalize_unbounded_list();

            Ok(SignOutput::new(
                format!("0x{}", hex::encode(sig_stream.out())),
                json!({ "v": format!("0x{v:x}"), "r": hex::encode(r), "s": hex::encode(s) }),
            ))
        }
    }

    fn sign_message(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let private_key = private_key_bytes(tx_data)?;
        let message = field_str(tx_data, "message")?;
        let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
        let digest = keccak256(prefixed.as_bytes());
        let (r, s, recovery_id) = self.sign_digest(&private_key, &digest)?;
        let v = 27 + recovery_id as u8;

        let mut encoded = Vec::with_capacity(65);
        encoded.extend_from_slice(&r);
        encoded.extend_from_slice(&s);
        encoded.push(v);

        Ok(SignOutput::new(
            format!("0x{}", hex::encode(encoded)),
            json!({ "v": format!("0x{v:x}"), "r": hex::encode(r), "s": hex::encode(s) }),
        ))
    }

    fn sign_digest(&self, private_key: &[u8; 32], digest: &[u8; 32]) -> Result<([u8; 32], [u8; 32], i32), Error> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|_| Error::InputInvalid("invalid private key".to_string()))?;
        let message = Message::from_digest(*digest);
        let signature = secp.sign_ecdsa_recoverable(&message, &secret_key);
        let (recovery_id, bytes) = signature.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok((r, s, recovery_id.to_i32()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_rlp_encodes_empty() {
        let mut stream = RlpStream::new();
        stream.begin_list(1);
        rlp_append_amount(&mut stream, 0);
        let out = stream.out();
        // Header byte for a single empty string item is 0xc1 0x80.
        assert_eq!(out.as_ref(), &[0xc1, 0x80]);
    }

    #[test]
    fn nonzero_amount_strips_leading_zero_bytes() {
        let mut stream = RlpStream::new();
        rlp_append_amount(&mut stream, 0xff);
        assert_eq!(stream.out().as_ref(), &[0x81, 0xff]);
    }
}
