use thiserror::Error;

/// Failures raised while normalising request-boundary values.
#[derive(Debug, Error)]
pub enum Error {
    /// An `Amount` field was not a non-negative integer, decimal string, or numeric JSON value.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A `ByteString` field was not `0x`-prefixed hex, bare hex, or a JSON string of either.
    #[error("invalid byte string: {0}")]
    InvalidByteString(String),
}
