use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use cwk_registry::{Coin, Registry};

use crate::cardano::CardanoSigner;
use crate::cosmos::CosmosSigner;
use crate::evm::EvmSigner;
use crate::other::OtherSigner;
use crate::polkadot::PolkadotSigner;
use crate::signer::{SignOutput, Signer};
use crate::solana::SolanaSigner;
use crate::tron::TronSigner;
use crate::utxo::UtxoSigner;
use crate::Error;

/// One signer per chain family, matching the blockchain family tags carried in the registry.
///
/// Constructed on first use and cached for the worker's lifetime (§4.3) — in practice each
/// variant is a stateless unit struct, so "caching" reduces to matching the family tag once per
/// dispatch rather than re-resolving it on every signing call within a batch.
enum Family {
    Utxo(UtxoSigner),
    Evm(EvmSigner),
    Cosmos(CosmosSigner),
    Polkadot(PolkadotSigner),
    Solana(SolanaSigner),
    Cardano(CardanoSigner),
    Tron(TronSigner),
    Other(OtherSigner),
}

impl Family {
    fn resolve(tag: &str) -> Option<Family> {
        match tag {
            "utxo" => Some(Family::Utxo(UtxoSigner)),
            "evm" => Some(Family::Evm(EvmSigner)),
            "cosmos" => Some(Family::Cosmos(CosmosSigner)),
            "polkadot" => Some(Family::Polkadot(PolkadotSigner)),
            "solana" => Some(Family::Solana(SolanaSigner)),
            "cardano" => Some(Family::Cardano(CardanoSigner)),
            "tron" => Some(Family::Tron(TronSigner)),
            "algorand" | "aptos" | "hedera" | "stellar" | "tezos" | "near" | "sui" | "xrp"
            | "ton" | "nervos" | "filecoin" | "icp" => Some(Family::Other(OtherSigner)),
            _ => None,
        }
    }

    fn as_signer(&self) -> &dyn Signer {
        match self {
            Family::Utxo(s) => s,
            Family::Evm(s) => s,
            Family::Cosmos(s) => s,
            Family::Polkadot(s) => s,
            Family::Solana(s) => s,
            Family::Cardano(s) => s,
            Family::Tron(s) => s,
            Family::Other(s) => s,
        }
    }
}

/// Resolves a coin id to a chain family signer, via the registry, and caches the resolution
/// for the worker's lifetime (§4.3). One dispatcher is constructed per worker invocation.
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    cache: RefCell<HashMap<String, Family>>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Dispatcher {
            registry,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve `coin_id`, then dispatch `method` with `tx_data` to the matching family signer.
    /// The family, once resolved for a blockchain tag, is cached and reused for the rest of this
    /// dispatcher's lifetime instead of being re-resolved on every call.
    pub fn sign(&self, coin_id: &str, method: &str, tx_data: &Value) -> Result<SignOutput, Error> {
        let coin = self.resolve_coin(coin_id)?;
        log::debug!(
            "dispatching coin '{}' (family '{}') to method '{}'",
            coin_id,
            coin.blockchain,
            method
        );

        if !self.cache.borrow().contains_key(&coin.blockchain) {
            let family = Family::resolve(&coin.blockchain)
                .ok_or_else(|| Error::UnsupportedChain(coin.blockchain.clone()))?;
            log::debug!("resolved family '{}' for the first time this run", coin.blockchain);
            self.cache.borrow_mut().insert(coin.blockchain.clone(), family);
        }

        let cache = self.cache.borrow();
        let family = cache
            .get(&coin.blockchain)
            .expect("resolved and inserted above");
        family.as_signer().sign(method, coin, tx_data)
    }

    fn resolve_coin(&self, coin_id: &str) -> Result<&'r Coin, Error> {
        if !self.registry.is_enabled(coin_id) {
            return Err(Error::UnsupportedChain(coin_id.to_string()));
        }
        Ok(self.registry.lookup(coin_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_coin_is_unsupported() {
        let registry = Registry::load().unwrap();
        let dispatcher = Dispatcher::new(&registry);
        let err = dispatcher
            .sign("does-not-exist", "signTransfer", &Value::Null)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedChain(_) | Error::Registry(_)));
    }

    #[test]
    fn denied_coin_is_unsupported() {
        let registry = Registry::load().unwrap();
        let dispatcher = Dispatcher::new(&registry);
        let err = dispatcher
            .sign("nimiq", "signTransfer", &Value::Null)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedChain(_)));
    }

    #[test]
    fn family_resolution_is_cached_after_first_use() {
        let registry = Registry::load().unwrap();
        let dispatcher = Dispatcher::new(&registry);
        assert!(dispatcher.cache.borrow().is_empty());
        let _ = dispatcher.sign("bitcoin", "signTransfer", &Value::Null);
        assert!(dispatcher.cache.borrow().contains_key("utxo"));
    }
}
