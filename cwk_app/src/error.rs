//! Front-end error taxonomy. Every variant maps to a stable `error` tag in the stderr envelope;
//! add new chain/signer error kinds upstream and wrap them here rather than inventing new tags.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not parse request: {0}")]
    InputParseError(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("derived address does not match the address supplied by the caller")]
    AddressMismatch,

    #[error(transparent)]
    Registry(#[from] cwk_registry::Error),

    #[error(transparent)]
    Keys(#[from] cwk_keys::Error),

    #[error(transparent)]
    Signer(#[from] cwk_signers::Error),

    #[error("could not serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable tag, independent of the human-readable `Display` text.
    pub fn tag(&self) -> &'static str {
        match self {
            Error::InputParseError(_) => "InputParseError",
            Error::UnknownCommand(_) => "UnknownCommand",
            Error::AddressMismatch => "AddressMismatch",
            Error::Registry(inner) => registry_tag(inner),
            Error::Keys(_) => "DerivationFailed",
            Error::Signer(inner) => signer_tag(inner),
            Error::Serialize(_) => "InternalError",
        }
    }
}

fn registry_tag(err: &cwk_registry::Error) -> &'static str {
    match err {
        cwk_registry::Error::UnknownCoin(_) => "UnknownCoin",
        cwk_registry::Error::Parse(_) | cwk_registry::Error::NoDerivation(_) => "InternalError",
    }
}

fn signer_tag(err: &cwk_signers::Error) -> &'static str {
    match err {
        cwk_signers::Error::UnsupportedChain(_) => "UnsupportedChain",
        cwk_signers::Error::UnsupportedMethod { .. } => "UnsupportedMethod",
        cwk_signers::Error::InputInvalid(_) => "InputInvalid",
        cwk_signers::Error::OutputInvalid(_) => "OutputInvalid",
        cwk_signers::Error::SigningFailed(_) => "SigningFailed",
        cwk_signers::Error::Derivation(_) => "DerivationFailed",
        cwk_signers::Error::Value(_) => "InputInvalid",
        cwk_signers::Error::Registry(inner) => registry_tag(inner),
    }
}
