//! The set of lookups the pipeline drives.

use async_trait::async_trait;

use crate::providers::client::ProviderClient;
use crate::providers::projection::{
    AddressInfoProjection, BuilderScoreProjection, FarcasterUserProjection, SocialsProjection,
    TokenBalancesProjection,
};
use crate::providers::types::{AddressInfo, ProviderResult, SocialIdentity, TokenBalance};

/// Everything the lookup pipeline needs from the outside world.
#[async_trait]
pub trait LookupSource: Send + Sync {
    async fn token_balances(&self, subject: &str) -> ProviderResult<Vec<TokenBalance>>;

    async fn address_info(&self, subject: &str) -> ProviderResult<AddressInfo>;

    async fn builder_score(&self, subject: &str) -> ProviderResult<Option<i64>>;

    async fn socials(&self, subject: &str) -> ProviderResult<Vec<SocialIdentity>>;

    /// Farcaster profile for `username`; `Ok(None)` if the user does not exist.
    async fn farcaster_user(&self, username: &str) -> ProviderResult<Option<SocialIdentity>>;
}

#[async_trait]
impl LookupSource for ProviderClient {
    async fn token_balances(&self, subject: &str) -> ProviderResult<Vec<TokenBalance>> {
        self.fetch::<TokenBalancesProjection>(subject).await
    }

    async fn address_info(&self, subject: &str) -> ProviderResult<AddressInfo> {
        self.fetch::<AddressInfoProjection>(subject).await
    }

    async fn builder_score(&self, subject: &str) -> ProviderResult<Option<i64>> {
        self.fetch::<BuilderScoreProjection>(subject).await
    }

    async fn socials(&self, subject: &str) -> ProviderResult<Vec<SocialIdentity>> {
        self.fetch::<SocialsProjection>(subject).await
    }

    async fn farcaster_user(&self, username: &str) -> ProviderResult<Option<SocialIdentity>> {
        self.fetch::<FarcasterUserProjection>(username).await
    }
}
