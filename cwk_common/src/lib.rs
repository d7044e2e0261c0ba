#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Request-boundary value types shared by every other crate in the workspace: normalising an
//! incoming JSON field into a definite-width integer or byte buffer, regardless of whether the
//! caller sent a JSON number, a decimal string, or `0x`-prefixed hex.
//!
//! To avoid circular dependencies this crate must not depend on other crates of the workspace.

mod amount;
mod byte_string;
mod error;

pub use crate::amount::Amount;
pub use crate::byte_string::ByteString;
pub use crate::error::Error;
