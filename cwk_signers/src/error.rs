use thiserror::Error;

/// Failures raised while dispatching to, or executing, a per-chain signer.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither the coin id nor its blockchain family tag resolved to a signer (§4.3).
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    /// The resolved signer does not implement the requested method.
    #[error("unsupported method '{method}' for chain '{coin}'")]
    UnsupportedMethod { coin: String, method: String },

    /// `txData` failed to validate before signing (§4.4 step 1).
    #[error("invalid transaction input: {0}")]
    InputInvalid(String),

    /// The signer produced output that failed its own schema validation (§4.4 step 3).
    #[error("invalid transaction output: {0}")]
    OutputInvalid(String),

    /// The underlying signing call completed but reported a business-level failure.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Key derivation failed inside a signer.
    #[error(transparent)]
    Derivation(#[from] cwk_keys::Error),

    /// A request-boundary amount or byte-string field failed to parse.
    #[error(transparent)]
    Value(#[from] cwk_common::Error),

    /// The chain registry could not resolve a coin referenced mid-signing.
    #[error(transparent)]
    Registry(#[from] cwk_registry::Error),
}
