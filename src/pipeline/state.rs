//! Lookup pipeline states.
//!
//! # States
//! - Idle: nothing in flight, optionally holding the remembered subject
//! - LoadingBalances → LoadingContractInfo → LoadingScore: one provider call each
//! - Done: aggregated report
//! - Error: message from the failing stage; partial results are dropped
//!
//! # State Transitions
//! ```text
//! Idle → LoadingBalances: non-empty subject submitted
//! LoadingBalances → LoadingContractInfo: balances fetched and filtered
//! LoadingContractInfo → Done: subject is a contract (score skipped)
//! LoadingContractInfo → LoadingScore: subject is not a contract
//! LoadingScore → Done: score fetched (socials best-effort)
//! Loading* → Error: stage failed
//! ```

use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::subject::Subject;
use crate::providers::{AddressInfo, SocialIdentity, TokenBalance};

/// Identity of one lookup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupContext {
    pub id: Uuid,
    pub subject: Subject,
}

impl LookupContext {
    pub fn new(subject: Subject) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
        }
    }
}

/// Everything a finished lookup produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    /// Balances above the USD threshold, in upstream order.
    pub balances: Vec<TokenBalance>,
    pub address: AddressInfo,
    /// Absent for contracts and when the provider has no score.
    pub score: Option<i64>,
    /// Absent for contracts and when the social lookup failed.
    pub socials: Option<Vec<SocialIdentity>>,
    /// Profile from the origin page, when the side channel resolved.
    pub platform_identity: Option<SocialIdentity>,
}

/// Published pipeline state. Every transition replaces the whole value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LookupState {
    Idle {
        subject: Option<Subject>,
    },
    LoadingBalances {
        ctx: LookupContext,
        progress: u8,
    },
    LoadingContractInfo {
        ctx: LookupContext,
        progress: u8,
        balances: Vec<TokenBalance>,
    },
    LoadingScore {
        ctx: LookupContext,
        progress: u8,
        balances: Vec<TokenBalance>,
        address: AddressInfo,
    },
    Done {
        ctx: LookupContext,
        report: LookupReport,
    },
    Error {
        ctx: LookupContext,
        message: String,
    },
}

impl Default for LookupState {
    fn default() -> Self {
        LookupState::Idle { subject: None }
    }
}

impl LookupState {
    /// Coarse 0-100 indicator for display.
    pub fn progress(&self) -> u8 {
        match self {
            LookupState::Idle { .. } => 0,
            LookupState::LoadingBalances { progress, .. }
            | LookupState::LoadingContractInfo { progress, .. }
            | LookupState::LoadingScore { progress, .. } => *progress,
            LookupState::Done { .. } | LookupState::Error { .. } => 100,
        }
    }

    pub fn context(&self) -> Option<&LookupContext> {
        match self {
            LookupState::Idle { .. } => None,
            LookupState::LoadingBalances { ctx, .. }
            | LookupState::LoadingContractInfo { ctx, .. }
            | LookupState::LoadingScore { ctx, .. }
            | LookupState::Done { ctx, .. }
            | LookupState::Error { ctx, .. } => Some(ctx),
        }
    }

    pub fn lookup_id(&self) -> Option<Uuid> {
        self.context().map(|ctx| ctx.id)
    }

    pub fn subject(&self) -> Option<&Subject> {
        match self {
            LookupState::Idle { subject } => subject.as_ref(),
            other => other.context().map(|ctx| &ctx.subject),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            LookupState::LoadingBalances { .. }
                | LookupState::LoadingContractInfo { .. }
                | LookupState::LoadingScore { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LookupState::Done { .. } | LookupState::Error { .. })
    }

    /// Same state with a new progress value. Non-loading states are returned
    /// unchanged.
    pub fn with_progress(&self, value: u8) -> Self {
        let mut next = self.clone();
        match &mut next {
            LookupState::LoadingBalances { progress, .. }
            | LookupState::LoadingContractInfo { progress, .. }
            | LookupState::LoadingScore { progress, .. } => *progress = value,
            _ => {}
        }
        next
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookupState::Idle { .. } => "idle",
            LookupState::LoadingBalances { .. } => "loading balances",
            LookupState::LoadingContractInfo { .. } => "loading contract info",
            LookupState::LoadingScore { .. } => "loading score",
            LookupState::Done { .. } => "done",
            LookupState::Error { .. } => "error",
        }
    }
}

/// Keep balances worth strictly more than `min_usd_value`, in order.
pub fn filter_balances(balances: Vec<TokenBalance>, min_usd_value: f64) -> Vec<TokenBalance> {
    balances
        .into_iter()
        .filter(|b| b.value_usd.is_some_and(|v| v > min_usd_value))
        .collect()
}

/// Drop identities whose source is in `excluded`.
pub fn filter_socials(socials: Vec<SocialIdentity>, excluded: &[String]) -> Vec<SocialIdentity> {
    socials
        .into_iter()
        .filter(|s| !excluded.iter().any(|tag| *tag == s.source))
        .collect()
}
