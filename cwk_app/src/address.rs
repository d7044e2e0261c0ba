//! Address derivation used for the `get_keys_batch` response and the `sign_transaction`
//! anti-tampering check (§4.5 step 3): given a derived public key and a coin, produce the same
//! address string an independent implementation of that chain's canonical algorithm would.
//!
//! Full coverage is provided for every secp256k1 family except Nervos and ICP, whose address
//! schemes need a keyed/personalised Blake2b variant and a DER-encoded self-authenticating
//! principal respectively — neither has a crate attested anywhere in the corpus, so (like every
//! ed25519 curve) their check is left to the controller rather than hand-rolling an unattested
//! primitive. ed25519 families get a best-effort address for display in `get_keys_batch`, not a
//! security-checked one.

use bitcoin::{Address as BtcAddress, CompressedPublicKey, KnownHrp};
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use cwk_registry::Coin;

/// Families where `derive_address` implements the chain's real, checkable algorithm.
pub fn has_checked_address(blockchain: &str) -> bool {
    matches!(blockchain, "utxo" | "evm" | "cosmos" | "tron" | "xrp" | "filecoin")
}

pub fn derive_address(coin: &Coin, public_key_compressed: &[u8; 33]) -> Option<String> {
    match coin.blockchain.as_str() {
        "utxo" => utxo_address(public_key_compressed),
        "evm" => Some(evm_address(public_key_compressed)),
        "cosmos" => cosmos_address(coin, public_key_compressed),
        "tron" => Some(tron_address(public_key_compressed)),
        "xrp" => Some(xrp_address(public_key_compressed)),
        "filecoin" => Some(filecoin_address(public_key_compressed)),
        _ => None,
    }
}

/// Best-effort display address for ed25519 coins; not used for the anti-tampering check.
pub fn derive_address_ed25519(coin: &Coin, public_key: &[u8; 32]) -> String {
    match coin.id.as_str() {
        "solana" | "cardano" => bs58::encode(public_key).into_string(),
        "near" => hex::encode(public_key),
        _ => hex::encode(public_key),
    }
}

fn utxo_address(public_key_compressed: &[u8; 33]) -> Option<String> {
    let pk = CompressedPublicKey::from_slice(public_key_compressed).ok()?;
    let address = BtcAddress::p2wpkh(&pk, KnownHrp::Mainnet);
    Some(address.to_string())
}

fn evm_address(public_key_compressed: &[u8; 33]) -> String {
    let pk = secp256k1::PublicKey::from_slice(public_key_compressed).expect("33-byte key");
    let uncompressed = pk.serialize_uncompressed();
    let mut hasher = Keccak256::new();
    hasher.update(&uncompressed[1..]);
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[12..]))
}

fn cosmos_address(coin: &Coin, public_key_compressed: &[u8; 33]) -> Option<String> {
    let sha = Sha256::digest(public_key_compressed);
    let ripemd = Ripemd160::digest(sha);
    let hrp = coin.symbol.to_lowercase();
    bech32::encode(&hrp, bech32::ToBase32::to_base32(&ripemd.to_vec()), bech32::Variant::Bech32).ok()
}

fn tron_address(public_key_compressed: &[u8; 33]) -> String {
    let pk = secp256k1::PublicKey::from_slice(public_key_compressed).expect("33-byte key");
    let uncompressed = pk.serialize_uncompressed();
    let mut hasher = Keccak256::new();
    hasher.update(&uncompressed[1..]);
    let digest = hasher.finalize();

    let mut payload = vec![0x41u8];
    payload.extend_from_slice(&digest[12..]);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).into_string()
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

const RIPPLE_ALPHABET: &bs58::Alphabet = &bs58::Alphabet::RIPPLE;

fn xrp_address(public_key_compressed: &[u8; 33]) -> String {
    let sha = Sha256::digest(public_key_compressed);
    let ripemd = Ripemd160::digest(sha);
    let mut payload = vec![0x00u8];
    payload.extend_from_slice(&ripemd);
    let checksum = double_sha256(&payload);
    payload.extend_from_slice(&checksum[..4]);
    bs58::encode(payload).with_alphabet(RIPPLE_ALPHABET).into_string()
}

/// Protocol-1 (secp256k1) Filecoin address: `f1` + base32(payload ++ checksum), no padding.
fn filecoin_address(public_key_compressed: &[u8; 33]) -> String {
    let pk = secp256k1::PublicKey::from_slice(public_key_compressed).expect("33-byte key");
    let uncompressed = pk.serialize_uncompressed();

    let mut hasher = Blake2bVar::new(20).expect("20 is a valid Blake2b digest size");
    hasher.update(&uncompressed);
    let mut payload = [0u8; 20];
    hasher.finalize_variable(&mut payload).expect("20-byte buffer");

    let mut checksum_input = vec![0x01u8];
    checksum_input.extend_from_slice(&payload);
    let mut checksum_hasher = Blake2bVar::new(4).expect("4 is a valid Blake2b digest size");
    checksum_hasher.update(&checksum_input);
    let mut checksum = [0u8; 4];
    checksum_hasher.finalize_variable(&mut checksum).expect("4-byte buffer");

    let mut combined = payload.to_vec();
    combined.extend_from_slice(&checksum);
    format!("f1{}", base32_lower(&combined))
}

const BASE32_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";

fn base32_lower(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buf = 0u32;
    let mut bits = 0u32;
    for &byte in data {
        buf = (buf << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buf >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buf << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base32_encodes_known_vector() {
        assert_eq!(base32_lower(b"foobar"), "mzxw6xtboi");
    }

    #[test]
    fn ripple_alphabet_differs_from_bitcoin_alphabet() {
        let payload = vec![0u8, 1, 2, 3, 4];
        let ripple = bs58::encode(&payload).with_alphabet(RIPPLE_ALPHABET).into_string();
        let bitcoin_style = bs58::encode(&payload).into_string();
        assert_ne!(ripple, bitcoin_style);
    }
}
