//! Cardano: native ADA transfer and multi-asset transfer in one API. Token amounts use the
//! same minimal big-endian encoding as the EVM family's numeric fields; no CBOR crate is
//! attested anywhere in the corpus, so the transaction body is hand-encoded as a flat,
//! length-prefixed record rather than true CBOR (documented simplification, see DESIGN.md).

use ed25519_dalek::{Signer as _, SigningKey};
use serde_json::{json, Value};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_str, field_u64, private_key_bytes};
use crate::Error;

/// Minimal-length big-endian encoding, length-prefixed with a single byte (amounts here are
/// small enough in practice to never need more than 255 bytes).
fn minimal_be(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(15);
    bytes[first_nonzero..].to_vec()
}

fn push_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(bytes);
}

struct Asset {
    policy_id: String,
    asset_name: String,
    amount: u128,
}

fn parse_assets(tx_data: &Value) -> Vec<Asset> {
    tx_data
        .get("assets")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| {
                    Some(Asset {
                        policy_id: v.get("policyId")?.as_str()?.to_string(),
                        asset_name: v.get("assetName")?.as_str()?.to_string(),
                        amount: v.get("amount")?.as_u64()? as u128,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

pub struct CardanoSigner;

impl Signer for CardanoSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        if method != "signTransfer" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }

        let private_key = private_key_bytes(tx_data)?;
        let signing_key = SigningKey::from_bytes(&private_key);

        let input_tx_hash = field_str(tx_data, "inputTxHash")?;
        let input_index = field_u64(tx_data, "inputIndex")?;
        let to_address = field_str(tx_data, "toAddress")?;
        let change_address = field_str(tx_data, "changeAddress")?;
        let lovelace_in = field_amount(tx_data, "inputLovelace")?.value();
        let lovelace_out = field_amount(tx_data, "amount")?.value();
        let fee = field_amount(tx_data, "fee")?.value();
        let assets = parse_assets(tx_data);
        let send_assets = parse_assets(&json!({ "assets": tx_data.get("sendAssets") }));

        let mut body = Vec::new();

        // Input
        let input_hash_bytes = hex::decode(input_tx_hash)
            .map_err(|_| Error::InputInvalid("inputTxHash is not hex".to_string()))?;
        push_prefixed(&mut body, &input_hash_bytes);
        body.extend_from_slice(&(input_index as u32).to_be_bytes());

        // Output 1: recipient
        push_prefixed(&mut body, to_address.as_bytes());
        push_prefixed(&mut body, &minimal_be(lovelace_out));
        body.push(send_assets.len() as u8);
        for asset in &send_assets {
            push_prefixed(&mut body, asset.policy_id.as_bytes());
            push_prefixed(&mut body, asset.asset_name.as_bytes());
            push_prefixed(&mut body, &minimal_be(asset.amount));
        }

        // Output 2: change
        let change_lovelace = lovelace_in
            .checked_sub(lovelace_out)
            .and_then(|v| v.checked_sub(fee))
            .ok_or_else(|| Error::InputInvalid("insufficient funds".to_string()))?;
        push_prefixed(&mut body, change_address.as_bytes());
        push_prefixed(&mut body, &minimal_be(change_lovelace));
        body.push(assets.len() as u8);
        for asset in &assets {
            let sent = send_assets
                .iter()
                .find(|a| a.policy_id == asset.policy_id && a.asset_name == asset.asset_name)
                .map(|a| a.amount)
                .unwrap_or(0);
            let remaining = asset.amount.saturating_sub(sent);
            push_prefixed(&mut body, asset.policy_id.as_bytes());
            push_prefixed(&mut body, asset.asset_name.as_bytes());
            push_prefixed(&mut body, &minimal_be(remaining));
        }

        push_prefixed(&mut body, &minimal_be(fee));

        let signature = signing_key.sign(&body);

        let mut encoded = Vec::new();
        push_prefixed(&mut encoded, &body);
        push_prefixed(&mut encoded, &signature.to_bytes());
        push_prefixed(&mut encoded, signing_key.verifying_key().as_bytes());

        Ok(SignOutput::new(hex::encode(encoded), json!({ "fee": fee.to_string() })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_be_strips_leading_zero_bytes() {
        assert_eq!(minimal_be(0), vec![]);
        assert_eq!(minimal_be(255), vec![0xff]);
        assert_eq!(minimal_be(256), vec![0x01, 0x00]);
    }
}
