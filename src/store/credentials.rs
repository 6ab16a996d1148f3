//! Provider credentials and the remembered subject, on top of [`KvStore`].

use std::fmt;
use std::str::FromStr;

use crate::providers::ProviderKind;
use crate::store::kv::{KvStore, StoreResult};

/// Slot holding the last looked-up subject.
pub const SEARCH_TERM_SLOT: &str = "searchTerm";
/// Slot holding the page URL the last subject came from.
pub const ORIGIN_URL_SLOT: &str = "originUrl";

/// A named credential slot. Several providers may share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSlot {
    Dune,
    TalentProtocol,
    Farcaster,
}

impl CredentialSlot {
    pub const ALL: [CredentialSlot; 3] = [
        CredentialSlot::Dune,
        CredentialSlot::TalentProtocol,
        CredentialSlot::Farcaster,
    ];

    /// Key under which the secret is persisted.
    pub fn key(self) -> &'static str {
        match self {
            CredentialSlot::Dune => "apiKeys.dune",
            CredentialSlot::TalentProtocol => "apiKeys.talentProtocol",
            CredentialSlot::Farcaster => "apiKeys.farcaster",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CredentialSlot::Dune => "dune",
            CredentialSlot::TalentProtocol => "talent",
            CredentialSlot::Farcaster => "farcaster",
        }
    }
}

impl fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for CredentialSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dune" | "sim" => Ok(CredentialSlot::Dune),
            "talent" | "talentprotocol" => Ok(CredentialSlot::TalentProtocol),
            "farcaster" | "neynar" => Ok(CredentialSlot::Farcaster),
            other => Err(format!(
                "unknown credential slot '{}' (expected dune, talent or farcaster)",
                other
            )),
        }
    }
}

/// Credential and subject access for the explorer.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    kv: KvStore,
}

impl CredentialStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Credential for `provider`, or `None` if the provider needs none or
    /// none is stored.
    pub fn get(&self, provider: ProviderKind) -> Option<String> {
        provider
            .credential_slot()
            .and_then(|slot| self.get_slot(slot))
    }

    /// Store the credential for `provider`. No-op for unauthenticated providers.
    pub fn set(&self, provider: ProviderKind, secret: &str) -> StoreResult<()> {
        match provider.credential_slot() {
            Some(slot) => self.set_slot(slot, secret),
            None => Ok(()),
        }
    }

    pub fn get_slot(&self, slot: CredentialSlot) -> Option<String> {
        self.kv.get(slot.key()).filter(|s| !s.is_empty())
    }

    pub fn set_slot(&self, slot: CredentialSlot, secret: &str) -> StoreResult<()> {
        self.kv.set(slot.key(), secret)
    }

    pub fn clear_slot(&self, slot: CredentialSlot) -> StoreResult<bool> {
        self.kv.remove(slot.key())
    }

    /// Remember the subject (and its origin page) of the latest lookup.
    pub fn remember_subject(&self, subject: &str, origin_url: Option<&str>) -> StoreResult<()> {
        self.kv.set(SEARCH_TERM_SLOT, subject)?;
        match origin_url {
            Some(url) => self.kv.set(ORIGIN_URL_SLOT, url),
            None => self.kv.remove(ORIGIN_URL_SLOT).map(|_| ()),
        }
    }

    /// The subject and origin page of the latest lookup, if any.
    pub fn last_subject(&self) -> Option<(String, Option<String>)> {
        let subject = self.kv.get(SEARCH_TERM_SLOT)?;
        Some((subject, self.kv.get(ORIGIN_URL_SLOT)))
    }

    pub fn kv(&self) -> &KvStore {
        &self.kv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_absent() {
        let store = CredentialStore::default();
        assert!(store.get(ProviderKind::TokenBalances).is_none());
        assert!(store.get(ProviderKind::AddressInfo).is_none());
    }

    #[test]
    fn test_set_overwrites_without_residue() {
        let store = CredentialStore::default();
        store.set(ProviderKind::TokenBalances, "a-long-first-key").unwrap();
        store.set(ProviderKind::TokenBalances, "b").unwrap();
        assert_eq!(store.get(ProviderKind::TokenBalances).as_deref(), Some("b"));
    }

    #[test]
    fn test_talent_slot_is_shared() {
        let store = CredentialStore::default();
        store.set(ProviderKind::BuilderScore, "talent-key").unwrap();
        assert_eq!(store.get(ProviderKind::Socials).as_deref(), Some("talent-key"));
        assert!(store.get(ProviderKind::Farcaster).is_none());
    }

    #[test]
    fn test_unauthenticated_provider_ignores_set() {
        let store = CredentialStore::default();
        store.set(ProviderKind::AddressInfo, "ignored").unwrap();
        assert!(store.get(ProviderKind::AddressInfo).is_none());
        assert!(store.kv().slots().is_empty());
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let store = CredentialStore::default();
        store.set_slot(CredentialSlot::Dune, "").unwrap();
        assert!(store.get(ProviderKind::TokenBalances).is_none());
    }

    #[test]
    fn test_remember_subject_clears_stale_origin() {
        let store = CredentialStore::default();
        store
            .remember_subject("0xabc", Some("https://warpcast.com/alice"))
            .unwrap();
        store.remember_subject("bob.eth", None).unwrap();
        assert_eq!(store.last_subject(), Some(("bob.eth".to_string(), None)));
    }

    #[test]
    fn test_slot_parsing() {
        assert_eq!("talent".parse::<CredentialSlot>(), Ok(CredentialSlot::TalentProtocol));
        assert_eq!("Dune".parse::<CredentialSlot>(), Ok(CredentialSlot::Dune));
        assert!("etherscan".parse::<CredentialSlot>().is_err());
    }
}
