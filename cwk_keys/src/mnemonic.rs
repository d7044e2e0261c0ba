use bip39::Mnemonic;

use crate::seed::Seed;
use crate::Error;

/// The entropy lengths BIP-39 accepts, in bytes (128/160/192/224/256 bits).
const VALID_ENTROPY_LENGTHS: [usize; 5] = [16, 20, 24, 28, 32];

/// Decode hex entropy and encode it as a BIP-39 mnemonic.
pub fn generate_mnemonic(entropy_hex: &str) -> Result<Mnemonic, Error> {
    let entropy = hex::decode(entropy_hex.trim())
        .map_err(|_| Error::InvalidEntropyHex(entropy_hex.to_string()))?;
    if !VALID_ENTROPY_LENGTHS.contains(&entropy.len()) {
        return Err(Error::InvalidEntropyLength(entropy.len()));
    }
    Ok(Mnemonic::from_entropy(&entropy)?)
}

/// True exactly when `phrase` is a valid BIP-39 mnemonic (word list and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_normalized(phrase).is_ok()
}

/// Derive the 512-bit seed from a mnemonic and an optional passphrase.
pub fn to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Seed {
    Seed::new(mnemonic.to_seed(passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generates_known_vector() {
        let entropy_hex = "00".repeat(16);
        let mnemonic = generate_mnemonic(&entropy_hex).unwrap();
        assert_eq!(mnemonic.to_string(), TEST_MNEMONIC);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(generate_mnemonic("00").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!(generate_mnemonic(&"zz".repeat(16)).is_err());
    }

    #[test]
    fn validates_known_mnemonic() {
        assert!(validate_mnemonic(TEST_MNEMONIC));
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut words: Vec<&str> = TEST_MNEMONIC.split(' ').collect();
        words.pop();
        words.push("abandon");
        let tampered = words.join(" ");
        assert!(!validate_mnemonic(&tampered));
    }

    #[test]
    fn seed_is_deterministic() {
        let mnemonic = Mnemonic::parse_normalized(TEST_MNEMONIC).unwrap();
        let seed1 = to_seed(&mnemonic, "");
        let seed2 = to_seed(&mnemonic, "");
        assert_eq!(seed1.as_bytes(), seed2.as_bytes());
    }

    #[test]
    fn different_passphrase_different_seed() {
        let mnemonic = Mnemonic::parse_normalized(TEST_MNEMONIC).unwrap();
        let seed1 = to_seed(&mnemonic, "");
        let seed2 = to_seed(&mnemonic, "tresor");
        assert_ne!(seed1.as_bytes(), seed2.as_bytes());
    }
}
