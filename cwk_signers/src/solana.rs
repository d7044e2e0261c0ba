//! Solana: native transfer, SPL token transfer, associated-token-account creation, and the
//! composite create-and-transfer operation. The wire format (shortvec-prefixed compact arrays,
//! a legacy `Message` followed by its signatures) is hand-built — no `solana-sdk` dependency is
//! attested anywhere in the corpus, so this follows the same "write the protocol out" approach
//! the teacher takes for its own PSET plumbing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signer as _, SigningKey};
use serde_json::{json, Value};

use cwk_registry::Coin;

use crate::signer::{SignOutput, Signer};
use crate::util::{field_amount, field_str, private_key_bytes};
use crate::Error;

const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111111111111";
const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

fn pubkey(s: &str) -> Result<[u8; 32], Error> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| Error::InputInvalid(format!("invalid base58 pubkey: {s}")))?;
    if bytes.len() != 32 {
        return Err(Error::InputInvalid(format!("pubkey is not 32 bytes: {s}")));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Solana's variable-length "shortvec" length prefix (7 bits per byte, MSB continuation flag).
fn shortvec_len(mut value: usize) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
    out
}

struct Instruction {
    program_id_index: u8,
    accounts: Vec<u8>,
    data: Vec<u8>,
}

struct MessageBuilder {
    account_keys: Vec<[u8; 32]>,
    num_signed: u8,
    readonly_unsigned: std::collections::HashSet<u8>,
}

impl MessageBuilder {
    fn new() -> Self {
        MessageBuilder {
            account_keys: Vec::new(),
            num_signed: 0,
            readonly_unsigned: std::collections::HashSet::new(),
        }
    }

    /// Register an account, returning its index. Signer accounts must be registered first.
    fn account_index(&mut self, key: [u8; 32]) -> u8 {
        if let Some(pos) = self.account_keys.iter().position(|k| *k == key) {
            return pos as u8;
        }
        self.account_keys.push(key);
        (self.account_keys.len() - 1) as u8
    }

    /// Register a program account: always unsigned and read-only.
    fn program_account_index(&mut self, key: [u8; 32]) -> u8 {
        let idx = self.account_index(key);
        self.readonly_unsigned.insert(idx);
        idx
    }

    fn build(self, recent_blockhash: [u8; 32], instructions: Vec<Instruction>) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.num_signed);
        out.push(0); // num_readonly_signed
        out.push(self.readonly_unsigned.len() as u8);

        out.extend_from_slice(&shortvec_len(self.account_keys.len()));
        for key in &self.account_keys {
            out.extend_from_slice(key);
        }

        out.extend_from_slice(&recent_blockhash);

        out.extend_from_slice(&shortvec_len(instructions.len()));
        for instr in instructions {
            out.push(instr.program_id_index);
            out.extend_from_slice(&shortvec_len(instr.accounts.len()));
            out.extend_from_slice(&instr.accounts);
            out.extend_from_slice(&shortvec_len(instr.data.len()));
            out.extend_from_slice(&instr.data);
        }
        out
    }
}

fn finish(message: Vec<u8>, signing_key: &SigningKey) -> String {
    let signature = signing_key.sign(&message);
    let mut tx = Vec::new();
    tx.extend_from_slice(&shortvec_len(1));
    tx.extend_from_slice(&signature.to_bytes());
    tx.extend_from_slice(&message);
    STANDARD.encode(&tx)
}

pub struct SolanaSigner;

impl Signer for SolanaSigner {
    fn sign(&self, method: &str, coin: &Coin, tx_data: &Value) -> Result<SignOutput, Error> {
        match method {
            "signTransfer" => self.sign_transfer(tx_data),
            "signTokenTransfer" => self.sign_token_transfer(tx_data),
            "signCreateTokenAccount" => self.sign_create_token_account(tx_data),
            "signCreateAndTransfer" => self.sign_create_and_transfer(tx_data),
            other => Err(Error::UnsupportedMethod {
                coin: coin.id.clone(),
                method: other.to_string(),
            }),
        }
    }
}

impl SolanaSigner {
    fn signing_key(&self, tx_data: &Value) -> Result<(SigningKey, [u8; 32]), Error> {
        let private_key = private_key_bytes(tx_data)?;
        let signing_key = SigningKey::from_bytes(&private_key);
        let from = signing_key.verifying_key().to_bytes();
        Ok((signing_key, from))
    }

    fn recent_blockhash(&self, tx_data: &Value) -> Result<[u8; 32], Error> {
        pubkey(field_str(tx_data, "recentBlockhash")?)
    }

    fn sign_transfer(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let (signing_key, from) = self.signing_key(tx_data)?;
        let to = pubkey(field_str(tx_data, "toAddress")?)?;
        let amount = field_amount(tx_data, "amount")?.value() as u64;
        let recent_blockhash = self.recent_blockhash(tx_data)?;

        let mut builder = MessageBuilder::new();
        let from_idx = builder.account_index(from);
        builder.num_signed = 1;
        let to_idx = builder.account_index(to);
        let program_idx = builder.program_account_index(pubkey(SYSTEM_PROGRAM)?);

        let mut data = vec![2, 0, 0, 0]; // SystemInstruction::Transfer
        data.extend_from_slice(&amount.to_le_bytes());

        let instruction = Instruction {
            program_id_index: program_idx,
            accounts: vec![from_idx, to_idx],
            data,
        };

        let message = builder.build(recent_blockhash, vec![instruction]);
        let encoded = finish(message, &signing_key);
        Ok(SignOutput::new(encoded, json!({})))
    }

    fn sign_token_transfer(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let (signing_key, authority) = self.signing_key(tx_data)?;
        let source = pubkey(field_str(tx_data, "senderTokenAddress")?)?;
        let destination = pubkey(field_str(tx_data, "recipientTokenAddress")?)?;
        let amount = field_amount(tx_data, "amount")?.value() as u64;
        let recent_blockhash = self.recent_blockhash(tx_data)?;

        let mut builder = MessageBuilder::new();
        let authority_idx = builder.account_index(authority);
        builder.num_signed = 1;
        let source_idx = builder.account_index(source);
        let dest_idx = builder.account_index(destination);
        let program_idx = builder.program_account_index(pubkey(TOKEN_PROGRAM)?);

        let mut data = vec![3u8]; // TokenInstruction::Transfer
        data.extend_from_slice(&amount.to_le_bytes());

        let instruction = Instruction {
            program_id_index: program_idx,
            accounts: vec![source_idx, dest_idx, authority_idx],
            data,
        };

        let message = builder.build(recent_blockhash, vec![instruction]);
        let encoded = finish(message, &signing_key);
        Ok(SignOutput::new(encoded, json!({})))
    }

    fn sign_create_token_account(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let (signing_key, payer) = self.signing_key(tx_data)?;
        let owner = pubkey(field_str(tx_data, "ownerAddress")?)?;
        let mint = pubkey(field_str(tx_data, "mintAddress")?)?;
        let ata = pubkey(field_str(tx_data, "tokenAccountAddress")?)?;
        let recent_blockhash = self.recent_blockhash(tx_data)?;

        let mut builder = MessageBuilder::new();
        let payer_idx = builder.account_index(payer);
        builder.num_signed = 1;
        let ata_idx = builder.account_index(ata);
        let owner_idx = builder.account_index(owner);
        let mint_idx = builder.account_index(mint);
        let system_idx = builder.program_account_index(pubkey(SYSTEM_PROGRAM)?);
        let token_idx = builder.program_account_index(pubkey(TOKEN_PROGRAM)?);
        let associated_idx = builder.program_account_index(pubkey(ASSOCIATED_TOKEN_PROGRAM)?);

        let instruction = Instruction {
            program_id_index: associated_idx,
            accounts: vec![payer_idx, ata_idx, owner_idx, mint_idx, system_idx, token_idx],
            data: Vec::new(),
        };

        let message = builder.build(recent_blockhash, vec![instruction]);
        let encoded = finish(message, &signing_key);
        Ok(SignOutput::new(encoded, json!({})))
    }

    fn sign_create_and_transfer(&self, tx_data: &Value) -> Result<SignOutput, Error> {
        let (signing_key, payer) = self.signing_key(tx_data)?;
        let owner = pubkey(field_str(tx_data, "ownerAddress")?)?;
        let mint = pubkey(field_str(tx_data, "mintAddress")?)?;
        let ata = pubkey(field_str(tx_data, "tokenAccountAddress")?)?;
        let source = pubkey(field_str(tx_data, "senderTokenAddress")?)?;
        let amount = field_amount(tx_data, "amount")?.value() as u64;
        let recent_blockhash = self.recent_blockhash(tx_data)?;

        let mut builder = MessageBuilder::new();
        let payer_idx = builder.account_index(payer);
        builder.num_signed = 1;
        let ata_idx = builder.account_index(ata);
        let owner_idx = builder.account_index(owner);
        let mint_idx = builder.account_index(mint);
        let system_idx = builder.program_account_index(pubkey(SYSTEM_PROGRAM)?);
        let token_idx = builder.program_account_index(pubkey(TOKEN_PROGRAM)?);
        let associated_idx = builder.program_account_index(pubkey(ASSOCIATED_TOKEN_PROGRAM)?);
        let source_idx = builder.account_index(source);

        let create = Instruction {
            program_id_index: associated_idx,
            accounts: vec![payer_idx, ata_idx, owner_idx, mint_idx, system_idx, token_idx],
            data: Vec::new(),
        };

        let mut transfer_data = vec![3u8];
        transfer_data.extend_from_slice(&amount.to_le_bytes());
        let transfer = Instruction {
            program_id_index: token_idx,
            accounts: vec![source_idx, ata_idx, payer_idx],
            data: transfer_data,
        };

        let message = builder.build(recent_blockhash, vec![create, transfer]);
        let encoded = finish(message, &signing_key);
        Ok(SignOutput::new(encoded, json!({})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortvec_encodes_small_lengths_single_byte() {
        assert_eq!(shortvec_len(5), vec![5]);
    }

    #[test]
    fn shortvec_encodes_multi_byte_lengths() {
        assert_eq!(shortvec_len(300), vec![0xac, 0x02]);
    }

    #[test]
    fn base64_roundtrips_known_vector() {
        assert_eq!(STANDARD.encode(b"foobar"), "Zm9vYmFy");
    }
}
