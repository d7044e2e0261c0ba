use thiserror::Error;

/// Failures raised by the key engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Entropy was not one of the BIP-39 lengths (128/160/192/224/256 bits).
    #[error("entropy must be 16, 20, 24, 28 or 32 bytes, got {0}")]
    InvalidEntropyLength(usize),

    /// Entropy was not valid hex.
    #[error("entropy is not valid hex: {0}")]
    InvalidEntropyHex(String),

    /// A BIP-39 mnemonic failed to parse or encode.
    #[error(transparent)]
    Bip39(#[from] bip39::Error),

    /// A derivation path string did not parse as `m/i'/i/...`.
    #[error("invalid derivation path '{0}'")]
    InvalidDerivationPath(String),

    /// A BIP-32 derivation step failed (e.g. a child-key index requires hardening).
    #[error(transparent)]
    Bip32(#[from] bitcoin::bip32::Error),

    /// An ed25519 derivation path is missing a segment to harden, or derivation produced an
    /// invalid signing key.
    #[error("ed25519 derivation failed: {0}")]
    Ed25519Derivation(String),
}
