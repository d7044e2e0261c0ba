use thiserror::Error;

/// Failures raised by the chain registry.
#[derive(Debug, Error)]
pub enum Error {
    /// The embedded registry document failed to parse. Fatal at startup.
    #[error("registry document failed to parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// `lookup` was asked for a coin id the registry has no entry for.
    #[error("unknown coin '{0}'")]
    UnknownCoin(String),

    /// A coin descriptor had no derivation entries, which violates the data model invariant.
    #[error("coin '{0}' has no derivation entries")]
    NoDerivation(String),
}
