//! Provider identities, projected data shapes and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::store::CredentialSlot;

/// One upstream data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Native balance and contract metadata (Blockscout).
    AddressInfo,
    /// Multichain token balances (Dune Sim).
    TokenBalances,
    /// Builder score (Talent Protocol).
    BuilderScore,
    /// Linked social identities (Talent Protocol).
    Socials,
    /// Farcaster user by username (Neynar).
    Farcaster,
}

/// How a non-success HTTP status is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Surface as [`ProviderError::Upstream`].
    Surface,
    /// Report as [`ProviderError::NoData`].
    NoData,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::AddressInfo => "address_info",
            ProviderKind::TokenBalances => "token_balances",
            ProviderKind::BuilderScore => "builder_score",
            ProviderKind::Socials => "socials",
            ProviderKind::Farcaster => "farcaster",
        }
    }

    /// Credential slot the provider authenticates with.
    pub fn credential_slot(self) -> Option<CredentialSlot> {
        match self {
            ProviderKind::AddressInfo => None,
            ProviderKind::TokenBalances => Some(CredentialSlot::Dune),
            ProviderKind::BuilderScore | ProviderKind::Socials => {
                Some(CredentialSlot::TalentProtocol)
            }
            ProviderKind::Farcaster => Some(CredentialSlot::Farcaster),
        }
    }

    pub fn status_policy(self) -> StatusPolicy {
        match self {
            ProviderKind::AddressInfo => StatusPolicy::NoData,
            _ => StatusPolicy::Surface,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Errors that can occur while calling a provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// No credential stored for a provider that requires one.
    #[error("missing {provider} credential")]
    MissingCredential { provider: ProviderKind },

    /// Transport failure (`status` is `None`) or non-success HTTP status.
    #[error("{provider} upstream error{}", status_suffix(.status))]
    Upstream {
        provider: ProviderKind,
        status: Option<u16>,
    },

    /// Body was not JSON.
    #[error("{provider} returned a malformed response")]
    MalformedResponse { provider: ProviderKind },

    /// The provider explicitly has nothing for this subject.
    #[error("no data")]
    NoData,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Native balance and contract metadata for an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub is_contract: bool,
    pub is_verified: bool,
    /// Native coin balance in wei, as a decimal string.
    pub coin_balance: Option<String>,
    pub display_name: Option<String>,
    pub creator_address: Option<String>,
}

/// One token holding reported by the balances aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub chain: String,
    pub chain_id: Option<u64>,
    /// Token contract, absent for native assets.
    pub address: Option<String>,
    /// Raw amount in base units, as a decimal string.
    pub amount: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u32>,
    pub price_usd: Option<f64>,
    pub value_usd: Option<f64>,
    pub pool_size: Option<f64>,
    pub low_liquidity: bool,
}

/// One linked identity (ENS, Farcaster, GitHub, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialIdentity {
    pub source: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub profile_url: Option<String>,
    pub image_url: Option<String>,
    pub follower_count: Option<u64>,
    pub following_count: Option<u64>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub owned_since: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Upstream {
            provider: ProviderKind::TokenBalances,
            status: Some(401),
        };
        assert_eq!(err.to_string(), "token_balances upstream error (HTTP 401)");

        let err = ProviderError::Upstream {
            provider: ProviderKind::Socials,
            status: None,
        };
        assert_eq!(err.to_string(), "socials upstream error");

        assert_eq!(ProviderError::NoData.to_string(), "no data");
        assert_eq!(
            ProviderError::MissingCredential { provider: ProviderKind::BuilderScore }.to_string(),
            "missing builder_score credential"
        );
    }

    #[test]
    fn test_only_address_info_is_unauthenticated() {
        assert!(ProviderKind::AddressInfo.credential_slot().is_none());
        assert_eq!(ProviderKind::AddressInfo.status_policy(), StatusPolicy::NoData);
        assert_eq!(ProviderKind::Socials.status_policy(), StatusPolicy::Surface);
        assert_eq!(
            ProviderKind::TokenBalances.credential_slot(),
            Some(CredentialSlot::Dune)
        );
    }
}
