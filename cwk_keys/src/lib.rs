#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! The key engine: BIP-39 entropy/mnemonic/seed conversions, and the two hierarchical-deterministic
//! derivation flavours the registry's coins are keyed on — secp256k1 (BIP-32) and ed25519
//! (SLIP-0010, hardened only). Every routine that touches private key material zeroises it before
//! the caller's handle is released, whether derivation succeeds or fails.

mod ed25519;
mod error;
mod mnemonic;
pub mod path;
mod secp256k1_key;
mod seed;

pub use bip39::Mnemonic;

pub use crate::ed25519::{derive as derive_ed25519, Ed25519KeyMaterial};
pub use crate::error::Error;
pub use crate::mnemonic::{generate_mnemonic, to_seed, validate_mnemonic};
pub use crate::secp256k1_key::{derive as derive_secp256k1, Secp256k1KeyMaterial};
pub use crate::seed::Seed;
