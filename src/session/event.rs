//! Inbound subject events.

use serde::{Deserialize, Serialize};

/// Where a subject came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Typed by the user.
    Manual,
    /// Selected elsewhere and delivered through the inbox.
    Selection,
}

/// A request to look up a subject. Both sources are handled identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEvent {
    pub source: EventSource,
    pub subject: String,
    pub origin_url: Option<String>,
}

impl SubjectEvent {
    pub fn manual(subject: impl Into<String>, origin_url: Option<String>) -> Self {
        Self {
            source: EventSource::Manual,
            subject: subject.into(),
            origin_url,
        }
    }

    pub fn selection(subject: impl Into<String>, origin_url: Option<String>) -> Self {
        Self {
            source: EventSource::Selection,
            subject: subject.into(),
            origin_url,
        }
    }

    /// Parse inbox file contents: first non-empty line is the subject, the
    /// next non-empty line (if any) is the origin URL.
    pub fn parse_selection(text: &str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let subject = lines.next()?;
        let origin_url = lines.next().map(str::to_string);
        Some(Self::selection(subject, origin_url))
    }
}
