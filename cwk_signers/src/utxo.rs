//! UTXO family: Bitcoin, BCH, Zcash, BitcoinDiamond, Groestlcoin, Horizen, Litecoin-like,
//! Dogecoin-like chains. All share a P2WPKH-first transaction model; BCH grafts a sighash-flag
//! quirk, Zcash/Horizen/BitcoinDiamond graft a branch-id quirk, and Taproot/BRC-20 inputs flow
//! through a per-input script-kind descriptor onto an otherwise identical build.

use std::str::FromStr;

use bitcoin::hashes::{hash160, Hash};
use bitcoin::key::{Keypair, TapTweak};
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::sighash::{EcdsaSighashType, Prevouts, SighashCache, TapSighashType};
use bitcoin::{
    opcodes, Address, Amount as BtcAmount, CompressedPublicKey, KnownHrp, OutPoint, ScriptBuf,
    Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use secp256k1::{Message, Secp256k1, SecretKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_bool, field_bytes, field_str, field_str_opt, field_u64, private_keys_bytes};
use crate::Error;

/// Chains whose replay-protection quirk must be folded into the sighash type.
fn forkid_sighash(coin_id: &str) -> bool {
    matches!(coin_id, "bitcoincash")
}

/// Chains that carry an extra consensus branch-id into the plan before the final sign.
fn branch_id_chain(coin_id: &str) -> bool {
    matches!(coin_id, "zcash" | "horizen" | "bitcoindiamond")
}

/// Per-input script-builder descriptor, overridable by the caller per `§4.4`'s V2 builder.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    P2wpkh,
    P2trKeyPath,
}

impl ScriptKind {
    fn from_input(input: &Value) -> Self {
        match field_str_opt(input, "scriptType") {
            Some("p2trKeyPath") => ScriptKind::P2trKeyPath,
            _ => ScriptKind::P2wpkh,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ScriptKind::P2wpkh => "p2wpkh",
            ScriptKind::P2trKeyPath => "p2trKeyPath",
        }
    }
}

/// P2PKH-lookalike script code used as the BIP143 sighash preimage for a P2WPKH input.
fn p2wpkh_script_code(pubkey_hash: &hash160::Hash) -> Result<ScriptBuf, Error> {
    let push = PushBytesBuf::try_from(pubkey_hash.to_byte_array().to_vec())
        .map_err(|_| Error::InputInvalid("pubkey hash too long".to_string()))?;
    Ok(Builder::new()
        .push_opcode(opcodes::all::OP_DUP)
        .push_opcode(opcodes::all::OP_HASH160)
        .push_slice(push)
        .push_opcode(opcodes::all::OP_EQUALVERIFY)
        .push_opcode(opcodes::all::OP_CHECKSIG)
        .into_script())
}

struct Input {
    outpoint: OutPoint,
    value: u64,
    private_key: [u8; 32],
    script_kind: ScriptKind,
}

fn parse_inputs(tx_data: &Value) -> Result<Vec<Input>, Error> {
    let keys = private_keys_bytes(tx_data)?;
    let inputs = tx_data
        .get("inputs")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InputInvalid("missing field 'inputs'".to_string()))?;
    if inputs.len() != keys.len() {
        return Err(Error::InputInvalid(
            "inputs and privateKeys length mismatch".to_string(),
        ));
    }
    inputs
        .iter()
        .zip(keys)
        .map(|(input, private_key)| {
            let txid_be = field_str(input, "txid")?;
            // The caller supplies the txid big-endian; internal wire order is little-endian.
            let mut bytes = hex::decode(txid_be)
                .map_err(|_| Error::InputInvalid("txid is not hex".to_string()))?;
            bytes.reverse();
            let txid = Txid::from_slice(&bytes)
                .map_err(|_| Error::InputInvalid("txid is not 32 bytes".to_string()))?;
            let vout = field_u64(input, "vout")? as u32;
            let value = field_amount(input, "value")?.value() as u64;
            Ok(Input {
                outpoint: OutPoint { txid, vout },
                value,
                private_key,
                script_kind: ScriptKind::from_input(input),
            })
        })
        .collect()
}

/// Conservative fixed-weight fee estimate for a single-signature P2WPKH transaction.
fn estimate_fee(num_inputs: usize, num_outputs: usize, byte_fee: u64) -> u64 {
    let size = 11 + num_inputs * 148 + num_outputs * 34;
    size as u64 * byte_fee
}

pub struct UtxoSigner;

impl Signer for UtxoSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        if method != "signTransfer" && method != "signBrc20Reveal" {
            return Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: method.to_string(),
            });
        }

        let inputs = parse_inputs(tx_data)?;
        if inputs.is_empty() {
            return Err(Error::InputInvalid("at least one input is required".to_string()));
        }
        let to_address = field_str(tx_data, "toAddress")?;
        let change_address = field_str(tx_data, "changeAddress")?;
        let byte_fee = field_amount(tx_data, "byteFee")?.value() as u64;
        let use_max = field_bool(tx_data, "useMax");
        let total_in: u64 = inputs.iter().map(|i| i.value).sum();

        let to_script = Address::from_str(to_address)
            .map_err(|_| Error::InputInvalid("toAddress is not a valid address".to_string()))?
            .assume_checked()
            .script_pubkey();
        let change_script = Address::from_str(change_address)
            .map_err(|_| Error::InputInvalid("changeAddress is not a valid address".to_string()))?
            .assume_checked()
            .script_pubkey();

        let (send_amount, has_change) = if use_max {
            let fee = estimate_fee(inputs.len(), 1, byte_fee);
            let amount = total_in
                .checked_sub(fee)
                .ok_or_else(|| Error::InputInvalid("insufficient funds for fee".to_string()))?;
            (amount, false)
        } else {
            let amount = field_amount(tx_data, "amount")?.value() as u64;
            let fee = estimate_fee(inputs.len(), 2, byte_fee);
            let remaining = total_in
                .checked_sub(amount)
                .and_then(|v| v.checked_sub(fee))
                .ok_or_else(|| Error::InputInvalid("insufficient funds".to_string()))?;
            (amount, remaining > 0)
        };

        let mut outputs = vec![TxOut {
            value: BtcAmount::from_sat(send_amount),
            script_pubkey: to_script,
        }];
        if has_change {
            let fee = estimate_fee(inputs.len(), 2, byte_fee);
            let change = total_in - send_amount - fee;
            outputs.push(TxOut {
                value: BtcAmount::from_sat(change),
                script_pubkey: change_script,
            });
        }

        let mut tx = Transaction {
            version: bitcoin::transaction::Version::TWO,
            lock_time: bitcoin::absolute::LockTime::ZERO,
            input: inputs
                .iter()
                .map(|i| TxIn {
                    previous_output: i.outpoint,
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                    witness: Witness::new(),
                })
                .collect(),
            output: outputs,
        };

        let secp = Secp256k1::new();

        // Every taproot sighash (BIP341) commits to the full prevout set, including inputs that
        // are themselves P2WPKH, so the V2 builder always derives one prevout per input from
        // that input's own key, regardless of which script kind eventually signs it.
        let prevouts = inputs
            .iter()
            .map(|input| {
                let secret_key = SecretKey::from_slice(&input.private_key)
                    .map_err(|_| Error::InputInvalid("invalid private key".to_string()))?;
                let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
                let script_pubkey = match input.script_kind {
                    ScriptKind::P2wpkh => {
                        let compressed = CompressedPublicKey::from_slice(&public_key.serialize())
                            .map_err(|e| Error::InputInvalid(e.to_string()))?;
                        Address::p2wpkh(&compressed, KnownHrp::Mainnet).script_pubkey()
                    }
                    ScriptKind::P2trKeyPath => {
                        let (x_only, _) = public_key.x_only_public_key();
                        Address::p2tr(&secp, x_only, None, KnownHrp::Mainnet).script_pubkey()
                    }
                };
                Ok(TxOut { value: BtcAmount::from_sat(input.value), script_pubkey })
            })
            .collect::<Result<Vec<TxOut>, Error>>()?;

        // SIGHASH_ALL | SIGHASH_FORKID is 0x41 for BCH-style replay protection; the preimage
        // construction itself (BIP143) is shared, only the trailing sighash-type byte differs.
        let forkid_byte: u8 = if forkid_sighash(&coin.id) { 0x41 } else { 0x01 };
        let needs_branch_id = branch_id_chain(&coin.id);
        let branch_id = if needs_branch_id {
            Some(field_bytes(tx_data, "branchId")?)
        } else {
            None
        };

        let mut script_kinds = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().enumerate() {
            script_kinds.push(input.script_kind.label());
            let secret_key = SecretKey::from_slice(&input.private_key)
                .map_err(|_| Error::InputInvalid("invalid private key".to_string()))?;

            match input.script_kind {
                ScriptKind::P2wpkh => {
                    let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
                    let compressed = public_key.serialize();
                    let pubkey_hash = hash160::Hash::hash(&compressed);
                    let script_code = p2wpkh_script_code(&pubkey_hash)?;

                    let sighash = SighashCache::new(&tx)
                        .p2wpkh_signature_hash(
                            idx,
                            &script_code,
                            BtcAmount::from_sat(input.value),
                            EcdsaSighashType::All,
                        )
                        .map_err(|e| Error::SigningFailed(e.to_string()))?;

                    // Zcash/Horizen/BitcoinDiamond fold their consensus branch id into the
                    // preimage after plan computation, before the final sign, mirroring how the
                    // BCH forkid byte is folded into the trailing sighash-type byte above — a
                    // deliberate simplification of the chains' native (ZIP-243-family) sighash in
                    // place of reproducing their full transaction digest algorithm.
                    let digest = match &branch_id {
                        Some(branch_id) => {
                            let mut preimage = sighash.to_byte_array().to_vec();
                            preimage.extend_from_slice(branch_id.as_bytes());
                            Sha256::digest(&preimage).into()
                        }
                        None => sighash.to_byte_array(),
                    };

                    let message = Message::from_digest(digest);
                    let signature = secp.sign_ecdsa(&message, &secret_key);
                    let mut sig_bytes = signature.serialize_der().to_vec();
                    sig_bytes.push(forkid_byte);

                    let mut witness = Witness::new();
                    witness.push(sig_bytes);
                    witness.push(compressed.to_vec());
                    tx.input[idx].witness = witness;
                }
                ScriptKind::P2trKeyPath => {
                    let sighash = SighashCache::new(&tx)
                        .taproot_key_spend_signature_hash(
                            idx,
                            &Prevouts::All(&prevouts),
                            TapSighashType::Default,
                        )
                        .map_err(|e| Error::SigningFailed(e.to_string()))?;

                    let keypair = Keypair::from_secret_key(&secp, &secret_key);
                    let tweaked = keypair.tap_tweak(&secp, None);
                    let message = Message::from_digest(sighash.to_byte_array());
                    let signature = secp.sign_schnorr(&message, &tweaked.to_inner());

                    let mut witness = Witness::new();
                    witness.push(signature.as_ref());
                    tx.input[idx].witness = witness;
                }
            }
        }

        let encoded = hex::encode(bitcoin::consensus::serialize(&tx));
        Ok(SignOutput::new(
            encoded,
            json!({ "txid": tx.compute_txid().to_string(), "inputScriptTypes": script_kinds }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_estimate_scales_with_inputs() {
        assert!(estimate_fee(2, 2, 1) > estimate_fee(1, 2, 1));
    }

    #[test]
    fn forkid_only_for_bch() {
        assert!(forkid_sighash("bitcoincash"));
        assert!(!forkid_sighash("bitcoin"));
    }

    #[test]
    fn branch_id_chains_are_exactly_zcash_family() {
        assert!(branch_id_chain("zcash"));
        assert!(branch_id_chain("horizen"));
        assert!(branch_id_chain("bitcoindiamond"));
        assert!(!branch_id_chain("bitcoin"));
    }

    #[test]
    fn script_kind_defaults_to_p2wpkh() {
        let input = json!({});
        assert!(ScriptKind::from_input(&input) == ScriptKind::P2wpkh);
        let input = json!({ "scriptType": "p2trKeyPath" });
        assert!(ScriptKind::from_input(&input) == ScriptKind::P2trKeyPath);
    }
}
