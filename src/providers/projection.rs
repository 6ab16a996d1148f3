//! Per-provider response projectors.
//!
//! A projector turns a decoded JSON body into the narrow shape the pipeline
//! uses. Projection never fails: missing or mistyped fields become absent.

use serde_json::Value;

use crate::providers::types::{AddressInfo, ProviderKind, SocialIdentity, TokenBalance};

/// Maps one provider's JSON body into its projected data.
pub trait Projection: Send + Sync {
    type Output: Send + 'static;

    /// Provider whose endpoint, credential and status policy apply.
    const PROVIDER: ProviderKind;

    fn project(body: &Value) -> Self::Output;
}

/// Blockscout `/api/v2/addresses/{address}`.
pub struct AddressInfoProjection;

impl Projection for AddressInfoProjection {
    type Output = AddressInfo;
    const PROVIDER: ProviderKind = ProviderKind::AddressInfo;

    fn project(body: &Value) -> AddressInfo {
        AddressInfo {
            is_contract: bool_field(body, "is_contract"),
            is_verified: bool_field(body, "is_verified"),
            coin_balance: string_field(body, "coin_balance"),
            display_name: string_field(body, "name"),
            creator_address: string_field(body, "creator_address_hash"),
        }
    }
}

/// Dune Sim `/v1/evm/balances/{address}`.
pub struct TokenBalancesProjection;

impl Projection for TokenBalancesProjection {
    type Output = Vec<TokenBalance>;
    const PROVIDER: ProviderKind = ProviderKind::TokenBalances;

    fn project(body: &Value) -> Vec<TokenBalance> {
        array_field(body, "balances")
            .iter()
            .map(|entry| TokenBalance {
                chain: string_field(entry, "chain").unwrap_or_default(),
                chain_id: u64_field(entry, "chain_id"),
                address: string_field(entry, "address"),
                amount: string_field(entry, "amount").unwrap_or_else(|| "0".to_string()),
                symbol: string_field(entry, "symbol"),
                name: string_field(entry, "name"),
                decimals: u64_field(entry, "decimals").and_then(|d| u32::try_from(d).ok()),
                price_usd: f64_field(entry, "price_usd"),
                value_usd: f64_field(entry, "value_usd"),
                pool_size: f64_field(entry, "pool_size"),
                low_liquidity: bool_field(entry, "low_liquidity"),
            })
            .collect()
    }
}

/// Talent Protocol `/score?id=`; yields `score.points`.
pub struct BuilderScoreProjection;

impl Projection for BuilderScoreProjection {
    type Output = Option<i64>;
    const PROVIDER: ProviderKind = ProviderKind::BuilderScore;

    fn project(body: &Value) -> Option<i64> {
        let points = body.pointer("/score/points")?;
        points
            .as_i64()
            .or_else(|| points.as_f64().filter(|p| p.is_finite()).map(|p| p.round() as i64))
    }
}

/// Talent Protocol `/socials?id=`.
pub struct SocialsProjection;

impl Projection for SocialsProjection {
    type Output = Vec<SocialIdentity>;
    const PROVIDER: ProviderKind = ProviderKind::Socials;

    fn project(body: &Value) -> Vec<SocialIdentity> {
        array_field(body, "socials")
            .iter()
            .map(|entry| SocialIdentity {
                source: string_field(entry, "source").unwrap_or_default(),
                display_name: string_field(entry, "display_name"),
                name: string_field(entry, "name"),
                profile_url: string_field(entry, "profile_url"),
                image_url: string_field(entry, "image_url"),
                follower_count: u64_field(entry, "follower_count"),
                following_count: u64_field(entry, "following_count"),
                bio: string_field(entry, "bio"),
                location: string_field(entry, "location"),
                owned_since: string_field(entry, "owned_since"),
            })
            .collect()
    }
}

/// Neynar `/v2/farcaster/user/by_username?username=`.
pub struct FarcasterUserProjection;

impl Projection for FarcasterUserProjection {
    type Output = Option<SocialIdentity>;
    const PROVIDER: ProviderKind = ProviderKind::Farcaster;

    fn project(body: &Value) -> Option<SocialIdentity> {
        let user = body.get("user").filter(|u| u.is_object())?;
        let username = string_field(user, "username");
        Some(SocialIdentity {
            source: "farcaster".to_string(),
            display_name: string_field(user, "display_name"),
            profile_url: username
                .as_ref()
                .map(|u| format!("https://farcaster.xyz/{}", u)),
            name: username,
            image_url: string_field(user, "pfp_url"),
            follower_count: u64_field(user, "follower_count"),
            following_count: u64_field(user, "following_count"),
            bio: user
                .pointer("/profile/bio/text")
                .and_then(Value::as_str)
                .map(str::to_string),
            location: None,
            owned_since: None,
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn f64_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_info_projection() {
        let body = json!({
            "is_contract": true,
            "is_verified": false,
            "coin_balance": "1250000000000000000",
            "name": "AlgebraPool",
            "creator_address_hash": "0x99556e210123da382eDEd3c72AA8DCb605C3c435",
            "ens_domain_name": null
        });
        let info = AddressInfoProjection::project(&body);
        assert!(info.is_contract);
        assert!(!info.is_verified);
        assert_eq!(info.coin_balance.as_deref(), Some("1250000000000000000"));
        assert_eq!(info.display_name.as_deref(), Some("AlgebraPool"));
        assert!(info.creator_address.is_some());
    }

    #[test]
    fn test_address_info_tolerates_missing_fields() {
        let info = AddressInfoProjection::project(&json!({"name": null, "is_contract": "yes"}));
        assert_eq!(info, AddressInfo::default());
    }

    #[test]
    fn test_token_balances_projection() {
        let body = json!({
            "wallet_address": "0xabc",
            "balances": [
                {
                    "chain": "base",
                    "chain_id": 8453,
                    "address": "native",
                    "amount": "40000000000000000",
                    "symbol": "ETH",
                    "decimals": 18,
                    "price_usd": 2500.5,
                    "value_usd": 100.02,
                    "pool_size": 1000000,
                    "low_liquidity": false
                },
                { "chain": "eth", "value_usd": "12.5" },
                "garbage"
            ]
        });
        let balances = TokenBalancesProjection::project(&body);
        assert_eq!(balances.len(), 3);
        assert_eq!(balances[0].chain_id, Some(8453));
        assert_eq!(balances[0].decimals, Some(18));
        assert_eq!(balances[0].pool_size, Some(1_000_000.0));
        assert_eq!(balances[1].value_usd, Some(12.5));
        assert_eq!(balances[1].amount, "0");
        assert_eq!(balances[2].chain, "");
        assert!(balances[2].value_usd.is_none());
    }

    #[test]
    fn test_token_balances_without_array() {
        assert!(TokenBalancesProjection::project(&json!({"error": "x"})).is_empty());
    }

    #[test]
    fn test_score_projection() {
        assert_eq!(BuilderScoreProjection::project(&json!({"score": {"points": 87}})), Some(87));
        assert_eq!(BuilderScoreProjection::project(&json!({"score": {"points": 41.6}})), Some(42));
        assert_eq!(BuilderScoreProjection::project(&json!({"score": {"points": null}})), None);
        assert_eq!(BuilderScoreProjection::project(&json!({})), None);
    }

    #[test]
    fn test_socials_projection() {
        let body = json!({
            "socials": [
                {
                    "source": "farcaster",
                    "display_name": "Alice",
                    "follower_count": 1200,
                    "following_count": 300,
                    "bio": "building",
                    "owned_since": "2023-01-01T00:00:00Z",
                    "profile_url": "https://farcaster.xyz/alice"
                },
                { "source": "efp", "follower_count": null }
            ]
        });
        let socials = SocialsProjection::project(&body);
        assert_eq!(socials.len(), 2);
        assert_eq!(socials[0].follower_count, Some(1200));
        assert_eq!(socials[0].owned_since.as_deref(), Some("2023-01-01T00:00:00Z"));
        assert_eq!(socials[1].source, "efp");
        assert!(socials[1].follower_count.is_none());
    }

    #[test]
    fn test_farcaster_projection() {
        let body = json!({
            "user": {
                "fid": 3,
                "username": "dwr",
                "display_name": "Dan",
                "pfp_url": "https://example.com/p.png",
                "follower_count": 500000,
                "profile": { "bio": { "text": "gm" } }
            }
        });
        let user = FarcasterUserProjection::project(&body).unwrap();
        assert_eq!(user.source, "farcaster");
        assert_eq!(user.name.as_deref(), Some("dwr"));
        assert_eq!(user.profile_url.as_deref(), Some("https://farcaster.xyz/dwr"));
        assert_eq!(user.bio.as_deref(), Some("gm"));

        assert!(FarcasterUserProjection::project(&json!({"user": null})).is_none());
    }
}
