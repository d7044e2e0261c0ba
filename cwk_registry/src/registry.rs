use std::collections::HashSet;

use crate::coin::Coin;
use crate::error::Error;

/// The chains never dispatched to a signer regardless of an allow-list (§4.1, §9 open question:
/// this is carried as a permanent policy default rather than transitional — see DESIGN.md).
const DENY_LIST: &[&str] = &["nimiq"];

/// The embedded registry document, the single source of truth for supported chains (§6).
const REGISTRY_JSON: &str = include_str!("../data/coins.json");

/// An immutable, in-memory catalogue of [`Coin`] descriptors, loaded once at process start.
#[derive(Debug, Clone)]
pub struct Registry {
    coins: Vec<Coin>,
    deny: HashSet<String>,
    allow: Option<HashSet<String>>,
}

impl Registry {
    /// Load the embedded registry document. A parse failure is fatal (§6).
    pub fn load() -> Result<Self, Error> {
        let raw = match std::env::var("CWK_REGISTRY_PATH") {
            Ok(path) => std::fs::read_to_string(&path).unwrap_or_else(|_| REGISTRY_JSON.to_string()),
            Err(_) => REGISTRY_JSON.to_string(),
        };
        Self::from_json(&raw, None)
    }

    /// Parse a registry document directly; used by `load` and by tests.
    pub fn from_json(raw: &str, allow: Option<HashSet<String>>) -> Result<Self, Error> {
        let coins: Vec<Coin> = serde_json::from_str(raw)?;
        for coin in &coins {
            if coin.derivation.is_empty() {
                return Err(Error::NoDerivation(coin.id.clone()));
            }
        }
        let deny = DENY_LIST.iter().map(|s| s.to_string()).collect();
        Ok(Registry { coins, deny, allow })
    }

    /// Restrict dispatch to exactly these coin ids. When both a deny-list and an allow-list name
    /// a coin, the allow-list wins (§4.1).
    pub fn with_allow_list(mut self, allow: HashSet<String>) -> Self {
        self.allow = Some(allow);
        self
    }

    /// Look up a coin by id. A missing coin is a fatal error for the caller's request (§4.1).
    pub fn lookup(&self, coin_id: &str) -> Result<&Coin, Error> {
        self.coins
            .iter()
            .find(|c| c.id == coin_id)
            .ok_or_else(|| Error::UnknownCoin(coin_id.to_string()))
    }

    /// Whether `coin_id` is currently dispatchable (not denied, and allow-listed if an allow-list
    /// is set).
    pub fn is_enabled(&self, coin_id: &str) -> bool {
        if let Some(allow) = &self.allow {
            return allow.contains(coin_id);
        }
        !self.deny.contains(coin_id)
    }

    /// Iterate over every dispatchable coin, in registry (file) order.
    pub fn iterate(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|c| self.is_enabled(&c.id))
    }

    /// Iterate over every coin unconditionally, including denied ones. Used for diagnostics only.
    pub fn iterate_all(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_list_excludes_nimiq() {
        let reg = Registry::load().expect("embedded registry parses");
        assert!(!reg.is_enabled("nimiq"));
        assert!(reg.iterate().all(|c| c.id != "nimiq"));
    }

    #[test]
    fn lookup_known_coin() {
        let reg = Registry::load().expect("embedded registry parses");
        let btc = reg.lookup("bitcoin").expect("bitcoin is in the registry");
        assert_eq!(btc.blockchain, "utxo");
    }

    #[test]
    fn lookup_unknown_coin_fails() {
        let reg = Registry::load().expect("embedded registry parses");
        assert!(reg.lookup("does-not-exist").is_err());
    }

    #[test]
    fn allow_list_wins_over_deny_list() {
        let reg = Registry::load()
            .expect("embedded registry parses")
            .with_allow_list(["nimiq".to_string()].into_iter().collect());
        assert!(reg.is_enabled("nimiq"));
        assert!(!reg.is_enabled("bitcoin"));
    }

    #[test]
    fn every_coin_has_at_least_one_derivation() {
        let reg = Registry::load().expect("embedded registry parses");
        for coin in reg.iterate_all() {
            assert!(coin.canonical_derivation().is_some(), "{}", coin.id);
        }
    }
}
