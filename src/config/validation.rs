//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint URLs must parse and use http(s)
//! - Validate value ranges (timeouts > 0, thresholds finite)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ExplorerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::{EndpointConfig, ExplorerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ExplorerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let providers = &config.providers;
    check_endpoint("providers.address_info", &providers.address_info, &mut errors);
    check_endpoint("providers.token_balances", &providers.token_balances, &mut errors);
    check_endpoint("providers.builder_score", &providers.builder_score, &mut errors);
    check_endpoint("providers.socials", &providers.socials, &mut errors);
    check_endpoint("providers.farcaster", &providers.farcaster, &mut errors);

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let pipeline = &config.pipeline;
    if !pipeline.min_usd_value.is_finite() || pipeline.min_usd_value < 0.0 {
        errors.push(ValidationError::new(
            "pipeline.min_usd_value",
            "must be a finite, non-negative number",
        ));
    }
    if pipeline.progress_tick_ms > 0 && pipeline.progress_tick_step == 0 {
        errors.push(ValidationError::new(
            "pipeline.progress_tick_step",
            "must be greater than 0 when ticking is enabled",
        ));
    }

    if config.store.path.trim().is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(field: &str, endpoint: &EndpointConfig, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(&endpoint.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.cannot_be_a_base() {
                errors.push(ValidationError::new(
                    format!("{}.base_url", field),
                    "cannot be used as a base URL",
                ));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            format!("{}.base_url", field),
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(format!("{}.base_url", field), e.to_string())),
    }

    if matches!(endpoint.credential_header.as_deref(), Some(h) if h.trim().is_empty()) {
        errors.push(ValidationError::new(
            format!("{}.credential_header", field),
            "must not be empty",
        ));
    }
    if matches!(endpoint.query_param.as_deref(), Some(p) if p.trim().is_empty()) {
        errors.push(ValidationError::new(
            format!("{}.query_param", field),
            "must not be empty",
        ));
    }
}
