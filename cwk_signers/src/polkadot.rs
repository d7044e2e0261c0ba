//! Polkadot family: Polkadot, Kusama, Acala, Polymesh. SCALE-encoded extrinsics signed with
//! ed25519 (the curve the registry keys these chains on). Polymesh additionally wraps the
//! transfer call in a `RuntimeCall` pallet-proxy call.

use ed25519_dalek::{Signer as _, SigningKey};
use serde_json::{json, Value};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_bytes, field_str, field_u64, private_key_bytes};
use crate::Error;

/// SCALE "compact" (general integer) encoding, parity-scale-codec's `Compact<u128>` wire format.
fn compact_encode(value: u128) -> Vec<u8> {
    const SINGLE_BYTE_MAX: u128 = 1 << 6;
    const TWO_BYTE_MAX: u128 = 1 << 14;
    const FOUR_BYTE_MAX: u128 = 1 << 30;

    if value < SINGLE_BYTE_MAX {
        vec![(value << 2) as u8]
    } else if value < TWO_BYTE_MAX {
        let encoded = ((value << 2) | 0b01) as u16;
        encoded.to_le_bytes().to_vec()
    } else if value < FOUR_BYTE_MAX {
        let encoded = ((value << 2) | 0b10) as u32;
        encoded.to_le_bytes().to_vec()
    } else {
        let bytes = value.to_le_bytes();
        let len = bytes.iter().rposition(|b| *b != 0).map(|i| i + 1).unwrap_or(1);
        let mut out = Vec::with_capacity(1 + len);
        out.push((((len - 4) as u8) << 2) | 0b11);
        out.extend_from_slice(&bytes[..len]);
        out
    }
}

/// `moduleIndex`/`methodIndex` for the `balances.transfer`-shaped call, caller-supplied because
/// pallet indices vary by runtime.
fn call_indices(tx_data: &Value) -> Result<(u8, u8), Error> {
    let indices = tx_data
        .get("callIndices")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InputInvalid("missing field 'callIndices'".to_string()))?;
    if indices.len() != 2 {
        return Err(Error::InputInvalid("callIndices must have 2 entries".to_string()));
    }
    let module = indices[0]
        .as_u64()
        .ok_or_else(|| Error::InputInvalid("callIndices[0] is not a number".to_string()))? as u8;
    let method = indices[1]
        .as_u64()
        .ok_or_else(|| Error::InputInvalid("callIndices[1] is not a number".to_string()))? as u8;
    Ok((module, method))
}

fn encode_era(tx_data: &Value) -> Vec<u8> {
    match (field_u64(tx_data, "blockNumber"), field_u64(tx_data, "period")) {
        (Ok(block_number), Ok(period)) => {
            let period = period.next_power_of_two().max(4);
            let phase = block_number % period;
            let quantize_factor = (period >> 12).max(1);
            let trailing_zeros = period.trailing_zeros().clamp(1, 15) as u16;
            let encoded = (trailing_zeros - 1) | (((phase / quantize_factor) as u16) << 4);
            encoded.to_le_bytes().to_vec()
        }
        _ => vec![0x00], // immortal era
    }
}

pub struct PolkadotSigner;

impl Signer for PolkadotSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        if method != "signTransfer" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }

        let private_key = private_key_bytes(tx_data)?;
        let signing_key = SigningKey::from_bytes(&private_key);
        let account_id = signing_key.verifying_key().to_bytes();

        let dest = field_bytes(tx_data, "destAccountId")?;
        if dest.as_bytes().len() != 32 {
            return Err(Error::InputInvalid("destAccountId must be 32 bytes".to_string()));
        }
        let amount = field_amount(tx_data, "amount")?.value();
        let (module_index, method_index) = call_indices(tx_data)?;

        let mut call = vec![module_index, method_index];
        call.push(0x00); // MultiAddress::Id
        call.extend_from_slice(dest.as_bytes());
        call.extend_from_slice(&compact_encode(amount));

        if coin.id == "polymesh" {
            // Wrap the inner call in a RuntimeCall via a caller-supplied outer pallet index pair.
            if let Some(wrapper) = tx_data.get("runtimeCallIndices").and_then(Value::as_array) {
                if wrapper.len() == 2 {
                    let outer_module = wrapper[0].as_u64().unwrap_or(0) as u8;
                    let outer_method = wrapper[1].as_u64().unwrap_or(0) as u8;
                    let mut wrapped = vec![outer_module, outer_method];
                    wrapped.extend_from_slice(&call);
                    call = wrapped;
                }
            }
        }

        let era = encode_era(tx_data);
        let nonce = field_u64(tx_data, "nonce")?;
        let tip = field_amount(tx_data, "tip").map(|a| a.value()).unwrap_or(0);
        let spec_version = field_u64(tx_data, "specVersion")? as u32;
        let transaction_version = field_u64(tx_data, "transactionVersion")? as u32;
        let genesis_hash = field_bytes(tx_data, "genesisHash")?;
        let block_hash = field_bytes(tx_data, "blockHash")?;

        let mut payload = Vec::new();
        payload.extend_from_slice(&call);
        payload.extend_from_slice(&era);
        payload.extend_from_slice(&compact_encode(nonce as u128));
        payload.extend_from_slice(&compact_encode(tip));
        payload.extend_from_slice(&spec_version.to_le_bytes());
        payload.extend_from_slice(&transaction_version.to_le_bytes());
        payload.extend_from_slice(genesis_hash.as_bytes());
        payload.extend_from_slice(block_hash.as_bytes());

        let signature = signing_key.sign(&payload);

        let mut extrinsic_body = Vec::new();
        extrinsic_body.push(0x84); // version 4, signed
        extrinsic_body.push(0x00); // MultiAddress::Id
        extrinsic_body.extend_from_slice(&account_id);
        extrinsic_body.push(0x00); // MultiSignature::Ed25519
        extrinsic_body.extend_from_slice(&signature.to_bytes());
        extrinsic_body.extend_from_slice(&era);
        extrinsic_body.extend_from_slice(&compact_encode(nonce as u128));
        extrinsic_body.extend_from_slice(&compact_encode(tip));
        extrinsic_body.extend_from_slice(&call);

        let mut encoded = compact_encode(extrinsic_body.len() as u128);
        encoded.extend_from_slice(&extrinsic_body);

        Ok(SignOutput::new(
            format!("0x{}", hex::encode(encoded)),
            json!({ "genesisHash": field_str(tx_data, "genesisHash").unwrap_or("") }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_encodes_small_values_single_byte() {
        assert_eq!(compact_encode(0), vec![0x00]);
        assert_eq!(compact_encode(63), vec![0xfc]);
    }

    #[test]
    fn compact_encodes_two_byte_range() {
        assert_eq!(compact_encode(64), vec![0x01, 0x01]);
    }

    #[test]
    fn compact_round_trips_two_to_the_64() {
        let encoded = compact_encode(1u128 << 64);
        // Big-integer mode: first byte mode bits are 0b11, length covers a 9-byte value.
        assert_eq!(encoded[0] & 0b11, 0b11);
        let len = ((encoded[0] >> 2) as usize) + 4;
        assert_eq!(len, 9);

        let mut buf = [0u8; 16];
        buf[..len].copy_from_slice(&encoded[1..]);
        assert_eq!(u128::from_le_bytes(buf), 1u128 << 64);
    }
}
