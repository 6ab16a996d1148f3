//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the explorer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the reputation explorer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Upstream provider endpoints.
    pub providers: ProvidersConfig,

    /// Timeout configuration for provider calls.
    pub timeouts: TimeoutConfig,

    /// Lookup pipeline tuning.
    pub pipeline: PipelineConfig,

    /// Key store location.
    pub store: StoreConfig,

    /// Inbound selection file.
    pub inbox: InboxConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Endpoint definition for one upstream provider.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Base URL. The subject is appended as a path segment unless
    /// `query_param` is set.
    pub base_url: String,

    /// Query parameter carrying the subject (e.g. `id`).
    #[serde(default)]
    pub query_param: Option<String>,

    /// Header carrying the credential. `None` for unauthenticated providers.
    #[serde(default)]
    pub credential_header: Option<String>,
}

impl EndpointConfig {
    fn path(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            query_param: None,
            credential_header: None,
        }
    }

    fn query(base_url: &str, param: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            query_param: Some(param.to_string()),
            credential_header: None,
        }
    }

    fn with_header(mut self, header: &str) -> Self {
        self.credential_header = Some(header.to_string());
        self
    }
}

/// Provider endpoint table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Balance/contract lookup (Blockscout).
    pub address_info: EndpointConfig,

    /// Multichain token balances (Dune Sim).
    pub token_balances: EndpointConfig,

    /// Builder score (Talent Protocol).
    pub builder_score: EndpointConfig,

    /// Linked social identities (Talent Protocol).
    pub socials: EndpointConfig,

    /// Farcaster user lookup (Neynar), used by the side channel.
    pub farcaster: EndpointConfig,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            address_info: EndpointConfig::path("https://eth.blockscout.com/api/v2/addresses"),
            token_balances: EndpointConfig::path("https://api.sim.dune.com/v1/evm/balances")
                .with_header("X-Sim-Api-Key"),
            builder_score: EndpointConfig::query("https://api.talentprotocol.com/score", "id")
                .with_header("X-API-KEY"),
            socials: EndpointConfig::query("https://api.talentprotocol.com/socials", "id")
                .with_header("X-API-KEY"),
            farcaster: EndpointConfig::query(
                "https://api.neynar.com/v2/farcaster/user/by_username",
                "username",
            )
            .with_header("x-api-key"),
            user_agent: concat!("reputation-explorer/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Timeout configuration for provider calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 20,
        }
    }
}

/// Lookup pipeline tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Token balances at or below this USD value are dropped.
    pub min_usd_value: f64,

    /// Social sources removed from the report.
    pub excluded_social_sources: Vec<String>,

    /// Idle progress tick interval in milliseconds (0 disables ticking).
    pub progress_tick_ms: u64,

    /// Progress added on every idle tick.
    pub progress_tick_step: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_usd_value: 50.0,
            excluded_social_sources: vec!["efp".to_string()],
            progress_tick_ms: 300,
            progress_tick_step: 3,
        }
    }
}

/// Key store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file holding credentials and the last subject.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "reputation-explorer.keys.json".to_string(),
        }
    }
}

/// Inbound selection file used by `watch` mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InboxConfig {
    /// File an external tool writes selected subjects into.
    pub path: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            path: "reputation-explorer.inbox".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ExplorerConfig = toml::from_str(
            r#"
            [pipeline]
            min_usd_value = 10.0

            [providers.address_info]
            base_url = "http://127.0.0.1:9000/addresses"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.min_usd_value, 10.0);
        assert_eq!(config.pipeline.excluded_social_sources, vec!["efp"]);
        assert_eq!(config.providers.address_info.base_url, "http://127.0.0.1:9000/addresses");
        assert!(config.providers.address_info.credential_header.is_none());
        assert_eq!(
            config.providers.token_balances.credential_header.as_deref(),
            Some("X-Sim-Api-Key")
        );
    }

    #[test]
    fn test_default_endpoints() {
        let providers = ProvidersConfig::default();
        assert_eq!(providers.builder_score.query_param.as_deref(), Some("id"));
        assert_eq!(providers.farcaster.query_param.as_deref(), Some("username"));
        assert!(providers.address_info.query_param.is_none());
    }
}
