use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::path;
use crate::seed::Seed;
use crate::Error;

type HmacSha512 = Hmac<Sha512>;

const SEED_KEY: &[u8] = b"ed25519 seed";

/// A derived ed25519 keypair. The private key is zeroised when dropped.
pub struct Ed25519KeyMaterial {
    private_key: [u8; 32],
    public_key: [u8; 32],
}

impl Drop for Ed25519KeyMaterial {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl Ed25519KeyMaterial {
    /// The raw 32-byte private key.
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// The raw 32-byte public key.
    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }
}

/// Derive an ed25519 keypair via SLIP-0010, following an all-hardened path such as
/// `m/44'/501'/0'/0'`. Every component, including the last, must be hardened.
pub fn derive(seed: &Seed, path: &str) -> Result<Ed25519KeyMaterial, Error> {
    let components = path::parse_hardened_components(path)?;

    let mut mac = HmacSha512::new_from_slice(SEED_KEY).expect("HMAC accepts any key length");
    mac.update(seed.as_bytes());
    let result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for child_index in components {
        let mut mac =
            HmacSha512::new_from_slice(&chain_code).expect("HMAC accepts any key length");
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&child_index.to_be_bytes());
        let result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    let signing_key = SigningKey::from_bytes(&key);
    let public_key = signing_key.verifying_key().to_bytes();

    let material = Ed25519KeyMaterial {
        private_key: key,
        public_key,
    };

    key.zeroize();
    chain_code.zeroize();

    Ok(material)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn seed() -> Seed {
        let mnemonic = bip39::Mnemonic::parse_normalized(TEST_MNEMONIC).unwrap();
        mnemonic::to_seed(&mnemonic, "")
    }

    #[test]
    fn derives_32_byte_keys() {
        let material = derive(&seed(), "m/44'/501'/0'/0'").unwrap();
        assert_eq!(material.private_key().len(), 32);
        assert_eq!(material.public_key().len(), 32);
    }

    #[test]
    fn is_deterministic() {
        let a = derive(&seed(), "m/44'/501'/0'/0'").unwrap();
        let b = derive(&seed(), "m/44'/501'/0'/0'").unwrap();
        assert_eq!(a.private_key(), b.private_key());
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn different_index_different_key() {
        let a = derive(&seed(), "m/44'/501'/0'/0'").unwrap();
        let b = derive(&seed(), "m/44'/501'/0'/1'").unwrap();
        assert_ne!(a.private_key(), b.private_key());
    }

    #[test]
    fn rejects_non_hardened_path() {
        assert!(derive(&seed(), "m/44'/501'/0/0").is_err());
    }
}
