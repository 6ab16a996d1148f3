//! Lookup subjects.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Hosts whose profile URLs name a Farcaster user in the first path segment.
const FARCASTER_HOSTS: [&str; 2] = ["warpcast.com", "farcaster.xyz"];

/// Rejected submissions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubjectError {
    #[error("subject is empty")]
    Empty,
}

/// Whether the subject is a hex address or a name to be resolved upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Address,
    Name,
}

/// The address or name being looked up, plus the page it was picked from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    value: String,
    origin_url: Option<String>,
    kind: SubjectKind,
}

impl Subject {
    /// Build a subject from user input. Surrounding whitespace is trimmed.
    pub fn new(value: &str, origin_url: Option<&str>) -> Result<Self, SubjectError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SubjectError::Empty);
        }

        let kind = if value.starts_with("0x") && value.parse::<Address>().is_ok() {
            SubjectKind::Address
        } else {
            SubjectKind::Name
        };

        Ok(Self {
            value: value.to_string(),
            origin_url: origin_url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            kind,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn origin_url(&self) -> Option<&str> {
        self.origin_url.as_deref()
    }

    pub fn kind(&self) -> SubjectKind {
        self.kind
    }

    /// Farcaster username named by the origin page, if it is a profile URL.
    pub fn farcaster_username(&self) -> Option<String> {
        farcaster_username(self.origin_url.as_deref()?)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Extract the username from a Farcaster profile URL
/// (`https://warpcast.com/<name>`, `https://farcaster.xyz/<name>`).
pub fn farcaster_username(origin_url: &str) -> Option<String> {
    let url = Url::parse(origin_url).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if !FARCASTER_HOSTS.contains(&host) {
        return None;
    }

    let first = url.path_segments()?.next()?;
    let name = first.strip_prefix('@').unwrap_or(first);
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    valid.then(|| name.to_ascii_lowercase())
}
