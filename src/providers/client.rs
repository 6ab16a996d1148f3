//! Provider HTTP client.
//!
//! # Responsibilities
//! - Build the request URL for a subject from the provider's endpoint config
//! - Attach the stored credential, failing fast when it is missing
//! - Map transport errors and HTTP statuses onto [`ProviderError`]
//! - Hand the decoded body to the provider's projector

use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::{EndpointConfig, ExplorerConfig, ProvidersConfig};
use crate::observability::metrics;
use crate::providers::projection::Projection;
use crate::providers::types::{ProviderError, ProviderKind, ProviderResult, StatusPolicy};
use crate::store::CredentialStore;

/// One HTTP GET capability shared by every provider.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    endpoints: ProvidersConfig,
    credentials: CredentialStore,
}

impl ProviderClient {
    /// Create a client from configuration and the credential store.
    pub fn new(config: &ExplorerConfig, credentials: CredentialStore) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .user_agent(config.providers.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            endpoints: config.providers.clone(),
            credentials,
        })
    }

    /// Endpoint configuration for `provider`.
    pub fn endpoint(&self, provider: ProviderKind) -> &EndpointConfig {
        match provider {
            ProviderKind::AddressInfo => &self.endpoints.address_info,
            ProviderKind::TokenBalances => &self.endpoints.token_balances,
            ProviderKind::BuilderScore => &self.endpoints.builder_score,
            ProviderKind::Socials => &self.endpoints.socials,
            ProviderKind::Farcaster => &self.endpoints.farcaster,
        }
    }

    /// Fetch `subject` from the provider named by `P` and project the body.
    pub async fn fetch<P: Projection>(&self, subject: &str) -> ProviderResult<P::Output> {
        let provider = P::PROVIDER;
        let endpoint = self.endpoint(provider);

        let credential = match (provider.credential_slot(), &endpoint.credential_header) {
            (Some(_), Some(header)) => match self.credentials.get(provider) {
                Some(secret) => Some((header.as_str(), secret)),
                None => {
                    tracing::warn!(provider = %provider, "Credential not set, skipping request");
                    metrics::record_provider_request(provider, "missing_credential");
                    return Err(ProviderError::MissingCredential { provider });
                }
            },
            _ => None,
        };

        let url = request_url(endpoint, subject).map_err(|e| {
            tracing::error!(provider = %provider, error = %e, "Invalid provider base URL");
            ProviderError::Upstream { provider, status: None }
        })?;

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some((header, secret)) = credential {
            request = request.header(header, secret);
        }

        tracing::debug!(provider = %provider, subject = %subject, "Provider request");
        let started = Instant::now();
        let result = request.send().await;
        metrics::record_provider_latency(provider, started.elapsed());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Provider request failed");
                metrics::record_provider_request(provider, "transport_error");
                return Err(ProviderError::Upstream { provider, status: None });
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(provider = %provider, status = %status, "Provider returned non-success status");
            metrics::record_provider_request(provider, "http_error");
            return Err(match provider.status_policy() {
                StatusPolicy::NoData => ProviderError::NoData,
                StatusPolicy::Surface => ProviderError::Upstream {
                    provider,
                    status: Some(status.as_u16()),
                },
            });
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Provider body is not JSON");
                metrics::record_provider_request(provider, "malformed");
                return Err(ProviderError::MalformedResponse { provider });
            }
        };

        metrics::record_provider_request(provider, "ok");
        Ok(P::project(&body))
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Place `subject` into the endpoint URL, as a query parameter or as the
/// last path segment.
pub fn request_url(endpoint: &EndpointConfig, subject: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&endpoint.base_url)?;
    match &endpoint.query_param {
        Some(param) => {
            url.query_pairs_mut().append_pair(param, subject);
        }
        None => {
            url.path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .pop_if_empty()
                .push(subject);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::projection::{AddressInfoProjection, TokenBalancesProjection};

    #[test]
    fn test_request_url_path_segment() {
        let endpoint = EndpointConfig {
            base_url: "https://eth.blockscout.com/api/v2/addresses/".to_string(),
            query_param: None,
            credential_header: None,
        };
        let url = request_url(&endpoint, "0xAbC").unwrap();
        assert_eq!(url.as_str(), "https://eth.blockscout.com/api/v2/addresses/0xAbC");

        let url = request_url(&endpoint, "a b/c").unwrap();
        assert_eq!(url.as_str(), "https://eth.blockscout.com/api/v2/addresses/a%20b%2Fc");
    }

    #[test]
    fn test_request_url_query_param() {
        let endpoint = EndpointConfig {
            base_url: "https://api.talentprotocol.com/score".to_string(),
            query_param: Some("id".to_string()),
            credential_header: Some("X-API-KEY".to_string()),
        };
        let url = request_url(&endpoint, "vitalik.eth").unwrap();
        assert_eq!(url.as_str(), "https://api.talentprotocol.com/score?id=vitalik.eth");
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_request() {
        let mut config = ExplorerConfig::default();
        // Unroutable: a request attempt would surface as Upstream, not MissingCredential.
        config.providers.token_balances.base_url = "http://127.0.0.1:1/balances".to_string();
        let client = ProviderClient::new(&config, CredentialStore::default()).unwrap();

        let err = client.fetch::<TokenBalancesProjection>("0xabc").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::MissingCredential { provider: ProviderKind::TokenBalances }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_error() {
        let mut config = ExplorerConfig::default();
        config.providers.address_info.base_url = "http://127.0.0.1:1/addresses".to_string();
        let client = ProviderClient::new(&config, CredentialStore::default()).unwrap();

        let err = client.fetch::<AddressInfoProjection>("0xabc").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Upstream { provider: ProviderKind::AddressInfo, status: None }
        );
    }
}
