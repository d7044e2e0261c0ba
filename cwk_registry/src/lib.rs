#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! The chain registry: an immutable catalogue of every chain the signing worker can dispatch to.
//!
//! Loaded once per invocation from an embedded JSON document (§6) via [`Registry::load`], and
//! never mutated afterwards. See [`Coin`] for the data model and [`Registry`] for lookup.

mod coin;
mod error;
mod registry;

pub use coin::{Coin, Curve, Derivation, XpubVersion};
pub use error::Error;
pub use registry::Registry;
