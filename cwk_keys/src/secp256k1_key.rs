use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use bitcoin::secp256k1::{PublicKey, Secp256k1};
use bitcoin::NetworkKind;
use zeroize::Zeroize;

use cwk_registry::XpubVersion;

use crate::seed::Seed;
use crate::Error;

/// A derived secp256k1 keypair plus the chain-code/depth/fingerprint needed to re-serialize an
/// extended public key under a caller-chosen version tag. The private key is zeroised on drop.
pub struct Secp256k1KeyMaterial {
    private_key: [u8; 32],
    public_key: PublicKey,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl Drop for Secp256k1KeyMaterial {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl Secp256k1KeyMaterial {
    /// The raw 32-byte private key.
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// The compressed SEC1 public key (33 bytes).
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Serialize the extended public key under the given version tag (`xpub`/`ypub`/`zpub`),
    /// falling back to `xpub`'s version bytes when an unrecognised tag slipped through (§4.1).
    pub fn xpub_string(&self, version: XpubVersion) -> String {
        let mut buf = Vec::with_capacity(78);
        buf.extend_from_slice(&version.version_bytes());
        buf.push(self.depth);
        buf.extend_from_slice(&self.parent_fingerprint);
        buf.extend_from_slice(&self.child_number.to_be_bytes());
        buf.extend_from_slice(&self.chain_code);
        buf.extend_from_slice(&self.public_key.serialize());
        bitcoin::base58::encode_check(&buf)
    }
}

/// Derive a secp256k1 keypair via BIP-32 from a seed and a path such as `m/84'/0'/0'`.
pub fn derive(seed: &Seed, path_str: &str) -> Result<Secp256k1KeyMaterial, Error> {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(NetworkKind::Main, seed.as_bytes())?;
    let path = DerivationPath::from_str(path_str)
        .map_err(|_| Error::InvalidDerivationPath(path_str.to_string()))?;
    let derived = master.derive_priv(&secp, &path)?;
    let xpub = Xpub::from_priv(&secp, &derived);

    let mut parent_fingerprint = [0u8; 4];
    parent_fingerprint.copy_from_slice(derived.parent_fingerprint.as_ref());

    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(derived.chain_code.as_ref());

    Ok(Secp256k1KeyMaterial {
        private_key: derived.private_key.secret_bytes(),
        public_key: xpub.public_key,
        chain_code,
        depth: derived.depth,
        parent_fingerprint,
        child_number: derived.child_number.into(),
    })
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
    fn derives_deterministically() {
        let a = derive(&seed(), "m/84'/0'/0'").unwrap();
        let b = derive(&seed(), "m/84'/0'/0'").unwrap();
        assert_eq!(a.private_key(), b.private_key());
    }

    #[test]
    fn different_paths_different_keys() {
        let a = derive(&seed(), "m/84'/0'/0'").unwrap();
        let b = derive(&seed(), "m/44'/0'/0'").unwrap();
        assert_ne!(a.private_key(), b.private_key());
    }

    #[test]
    fn xpub_string_has_expected_prefix() {
        let material = derive(&seed(), "m/84'/0'/0'").unwrap();
        assert!(material.xpub_string(XpubVersion::Xpub).starts_with("xpub"));
        assert!(material.xpub_string(XpubVersion::Ypub).starts_with('y'));
        assert!(material.xpub_string(XpubVersion::Zpub).starts_with('z'));
    }

    #[test]
    fn rejects_invalid_path() {
        assert!(derive(&seed(), "not-a-path").is_err());
    }
}
