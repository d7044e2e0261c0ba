//! Cosmos family: Cosmos Hub, Osmosis, Kava, Band, Agoric, Bluzelle, Crypto.org, Stargaze,
//! Secret, Terra, Thorchain, Kujira, Sei, Injective and any other chain tagged `cosmos`.
//!
//! The sender address is normally the bech32 encoding of `ripemd160(sha256(pubkey))` (grounded
//! on the teacher's own `forbole-cosmos-rust-wallet` derivation); Thorchain and Injective pass
//! address bytes through directly instead.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bech32::{ToBase32, Variant};
use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmos_sdk_proto::cosmos::tx::v1beta1::mode_info::{Single, Sum};
use cosmos_sdk_proto::cosmos::tx::v1beta1::{AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, TxBody, TxRaw};
use cosmos_sdk_proto::Any;
use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::{Signature, SigningKey};
use prost::Message;
use ripemd::Ripemd160;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_str, field_str_opt, field_u64, private_key_bytes};
use crate::Error;

/// Chains whose sender address is the raw address bytes, not derived from the public key.
fn passthrough_address(coin_id: &str) -> bool {
    matches!(coin_id, "thorchain" | "injective")
}

/// Chains that historically return a JSON envelope instead of the protobuf-serialised tx.
fn json_envelope(coin_id: &str) -> bool {
    matches!(coin_id, "kava" | "bluzelle" | "cryptoorg")
}

/// Hand-encodes `{bytes key = 1;}`, the wire shape of `cosmos.crypto.secp256k1.PubKey`.
fn encode_pubkey_field(key: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + key.len());
    buf.push(0x0a);
    buf.push(key.len() as u8);
    buf.extend_from_slice(key);
    buf
}

fn bech32_address(hrp: &str, public_key: &[u8; 33]) -> Result<String, Error> {
    let sha = Sha256::digest(public_key);
    let ripemd = Ripemd160::digest(sha);
    let address_bytes = ripemd.to_vec();
    bech32::encode(hrp, address_bytes.to_base32(), Variant::Bech32)
        .map_err(|e| Error::InputInvalid(e.to_string()))
}

fn build_send_message(tx_data: &Value, from: &str) -> Result<Any, Error> {
    let to = field_str(tx_data, "toAddress")?;
    let denom = field_str(tx_data, "denom")?;
    let amount = field_str(tx_data, "amount")?;

    let msg = MsgSend {
        from_address: from.to_string(),
        to_address: to.to_string(),
        amount: vec![ProtoCoin {
            denom: denom.to_string(),
            amount: amount.to_string(),
        }],
    };
    let mut buf = Vec::new();
    msg.encode(&mut buf).map_err(|e| Error::OutputInvalid(e.to_string()))?;
    Ok(Any {
        type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
        value: buf,
    })
}

pub struct CosmosSigner;

impl Signer for CosmosSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        if method != "signTransfer" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }

        let private_key = private_key_bytes(tx_data)?;
        let signing_key = SigningKey::from_slice(&private_key)
            .map_err(|e| Error::InputInvalid(e.to_string()))?;
        let public_key = signing_key.verifying_key().to_encoded_point(true);
        let mut public_key_bytes = [0u8; 33];
        public_key_bytes.copy_from_slice(public_key.as_bytes());

        let from_address = if passthrough_address(&coin.id) {
            field_str(tx_data, "fromAddress")?.to_string()
        } else {
            let hrp = field_str_opt(tx_data, "hrp").unwrap_or(coin.symbol.as_str());
            bech32_address(hrp, &public_key_bytes)?
        };

        let any = build_send_message(tx_data, &from_address)?;

        let memo = field_str_opt(tx_data, "memo").unwrap_or("").to_string();
        let timeout_height = field_u64(tx_data, "timeoutHeight").unwrap_or(0);

        let tx_body = TxBody {
            messages: vec![any],
            memo,
            timeout_height,
            extension_options: Vec::new(),
            non_critical_extension_options: Vec::new(),
        };
        let mut body_buf = Vec::new();
        tx_body.encode(&mut body_buf).map_err(|e| Error::OutputInvalid(e.to_string()))?;

        let public_key_any = Any {
            type_url: "/cosmos.crypto.secp256k1.PubKey".to_string(),
            value: encode_pubkey_field(&public_key_bytes),
        };

        let sequence = field_u64(tx_data, "sequence")?;
        let signer_info = SignerInfo {
            public_key: Some(public_key_any),
            mode_info: Some(ModeInfo {
                sum: Some(Sum::Single(Single { mode: 1 })),
            }),
            sequence,
        };

        let gas_limit = field_u64(tx_data, "gasLimit").unwrap_or(200_000);
        let fee_amount = field_str_opt(tx_data, "feeAmount").unwrap_or("0").to_string();
        let fee_denom = field_str_opt(tx_data, "feeDenom")
            .or_else(|| field_str_opt(tx_data, "denom"))
            .unwrap_or("")
            .to_string();
        let fee = Fee {
            amount: vec![ProtoCoin {
                denom: fee_denom,
                amount: fee_amount,
            }],
            gas_limit,
            payer: String::new(),
            granter: String::new(),
        };

        let auth_info = AuthInfo {
            signer_infos: vec![signer_info],
            fee: Some(fee),
        };
        let mut auth_buf = Vec::new();
        auth_info.encode(&mut auth_buf).map_err(|e| Error::OutputInvalid(e.to_string()))?;

        let chain_id = field_str(tx_data, "chainId")?.to_string();
        let account_number = field_u64(tx_data, "accountNumber")?;

        let sign_doc = SignDoc {
            body_bytes: body_buf.clone(),
            auth_info_bytes: auth_buf.clone(),
            chain_id,
            account_number,
        };
        let mut sign_doc_buf = Vec::new();
        sign_doc.encode(&mut sign_doc_buf).map_err(|e| Error::OutputInvalid(e.to_string()))?;

        let signature: Signature = signing_key.sign(&sign_doc_buf);
        let signature_bytes = signature.to_bytes().to_vec();

        let tx_raw = TxRaw {
            body_bytes: body_buf,
            auth_info_bytes: auth_buf,
            signatures: vec![signature_bytes],
        };
        let mut tx_raw_buf = Vec::new();
        tx_raw.encode(&mut tx_raw_buf).map_err(|e| Error::OutputInvalid(e.to_string()))?;

        if json_envelope(&coin.id) {
            let envelope = json!({
                "tx_bytes": STANDARD.encode(&tx_raw_buf),
                "mode": "BROADCAST_MODE_SYNC",
            });
            Ok(SignOutput::new(
                envelope.to_string(),
                json!({ "fromAddress": from_address }),
            ))
        } else {
            Ok(SignOutput::new(
                hex::encode(&tx_raw_buf),
                json!({ "fromAddress": from_address }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thorchain_uses_address_passthrough() {
        assert!(passthrough_address("thorchain"));
        assert!(passthrough_address("injective"));
        assert!(!passthrough_address("cosmoshub"));
    }

    #[test]
    fn kava_uses_json_envelope() {
        assert!(json_envelope("kava"));
        assert!(!json_envelope("cosmoshub"));
    }
}
