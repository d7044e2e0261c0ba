use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// The elliptic curve a coin's keys live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// ECDSA over secp256k1 (Bitcoin, EVM, Cosmos, …).
    Secp256k1,
    /// EdDSA over ed25519 (Solana, NEAR, Aptos, …).
    Ed25519,
}

/// The extended-public-key version tag used to serialize a derived `xpub`.
///
/// Resolved through a fixed table; an unrecognised or absent tag falls back to [`Self::Xpub`]
/// (a warning, not a fatal error — see §4.1 of the spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XpubVersion {
    /// BIP-32/44 legacy P2PKH, version bytes `0488b21e`.
    #[default]
    Xpub,
    /// BIP-49 P2SH-wrapped segwit, version bytes `049d7cb2`.
    Ypub,
    /// BIP-84 native segwit, version bytes `04b24746`.
    Zpub,
}

impl XpubVersion {
    /// The 4 mainnet version bytes this tag serializes to.
    pub fn version_bytes(self) -> [u8; 4] {
        match self {
            XpubVersion::Xpub => [0x04, 0x88, 0xb2, 0x1e],
            XpubVersion::Ypub => [0x04, 0x9d, 0x7c, 0xb2],
            XpubVersion::Zpub => [0x04, 0xb2, 0x47, 0x46],
        }
    }
}

impl FromStr for XpubVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xpub" => Ok(XpubVersion::Xpub),
            "ypub" => Ok(XpubVersion::Ypub),
            "zpub" => Ok(XpubVersion::Zpub),
            _ => Err(()),
        }
    }
}

// Unlike a derived `Deserialize`, an unrecognised tag must not abort the whole registry load
// (§4.1) — so this falls back through `FromStr` instead of failing the parse.
impl<'de> Deserialize<'de> for XpubVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(XpubVersion::from_str(&raw).unwrap_or_else(|_| {
            log::warn!("unrecognized xpub_version '{raw}', falling back to xpub");
            XpubVersion::Xpub
        }))
    }
}

/// One derivation entry of a [`Coin`]: the HD path to use, and how to serialize its xpub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derivation {
    /// HD path, e.g. `m/84'/0'/0'`. The key engine hardens the last segment for ed25519 coins.
    pub path: String,

    /// Extended-key version tag. Absent/unrecognised values fall back to `xpub` at load time.
    #[serde(default)]
    pub xpub_version: XpubVersion,
}

/// An immutable catalogue entry describing one supported chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    /// Stable, unique chain identifier, e.g. `bitcoin`, `ethereum`, `cosmoshub`.
    pub id: String,

    /// Broader blockchain-family tag used as a dispatch fallback, e.g. `evm`, `cosmos`, `utxo`.
    pub blockchain: String,

    /// The curve this coin's keys are derived on.
    pub curve: Curve,

    /// Numeric coin type (SLIP-44), passed through to the signing library.
    pub coin_type: u32,

    /// At least one derivation entry; `derivation[0]` is canonical (§4.1).
    pub derivation: Vec<Derivation>,

    /// Ticker symbol, e.g. `BTC`.
    pub symbol: String,

    /// Display name, e.g. `Bitcoin`.
    pub name: String,

    /// Smallest-unit decimal places.
    pub decimals: u32,
}

impl Coin {
    /// The canonical derivation entry (`derivation[0]`), per §4.1.
    pub fn canonical_derivation(&self) -> Option<&Derivation> {
        self.derivation.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_xpub_version_falls_back_to_xpub_instead_of_failing() {
        let derivation: Derivation =
            serde_json::from_str(r#"{"path":"m/44'/0'/0'","xpub_version":"wpub"}"#).unwrap();
        assert_eq!(derivation.xpub_version, XpubVersion::Xpub);
    }

    #[test]
    fn missing_xpub_version_defaults_to_xpub() {
        let derivation: Derivation = serde_json::from_str(r#"{"path":"m/44'/0'/0'"}"#).unwrap();
        assert_eq!(derivation.xpub_version, XpubVersion::Xpub);
    }
}
