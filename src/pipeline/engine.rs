//! Sequential lookup pipeline.
//!
//! # Responsibilities
//! - Drive token balances → address info → score → socials, one call at a time
//! - Skip score and socials for contracts
//! - Publish every state to subscribers through a watch channel
//! - Run the Farcaster side channel next to the main stages and merge it in

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tokio::time::{interval_at, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::observability::metrics;
use crate::pipeline::progress::{
    ProgressTicker, BALANCES_START, COMPLETE, CONTRACT_INFO_START, SCORE_START,
};
use crate::pipeline::state::{
    filter_balances, filter_socials, LookupContext, LookupReport, LookupState,
};
use crate::pipeline::subject::Subject;
use crate::providers::{LookupSource, ProviderError, ProviderResult, SocialIdentity};

type SideChannel = JoinHandle<ProviderResult<Option<SocialIdentity>>>;

/// Runs lookups against a [`LookupSource`] and publishes their states.
///
/// Starting a lookup supersedes the previous one: states from an older run
/// are no longer published once a newer run has started.
pub struct LookupPipeline {
    source: Arc<dyn LookupSource>,
    min_usd_value: f64,
    excluded_social_sources: Vec<String>,
    ticker: ProgressTicker,
    state_tx: Arc<watch::Sender<LookupState>>,
    side_tasks: Mutex<Vec<AbortHandle>>,
}

impl LookupPipeline {
    pub fn new(source: Arc<dyn LookupSource>, config: &PipelineConfig) -> Self {
        let (state_tx, _) = watch::channel(LookupState::default());
        Self {
            source,
            min_usd_value: config.min_usd_value,
            excluded_social_sources: config.excluded_social_sources.clone(),
            ticker: ProgressTicker::from_config(config),
            state_tx: Arc::new(state_tx),
            side_tasks: Mutex::new(Vec::new()),
        }
    }

    /// Receiver observing every published state.
    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.state_tx.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> LookupState {
        self.state_tx.borrow().clone()
    }

    /// Return to `Idle`, optionally showing `subject`.
    pub fn reset(&self, subject: Option<Subject>) {
        self.abort_side_channel();
        self.state_tx.send_replace(LookupState::Idle { subject });
    }

    /// Run a full lookup for `subject` and return its terminal state.
    pub async fn run(&self, subject: Subject) -> LookupState {
        let ctx = LookupContext::new(subject);
        let span = tracing::info_span!("lookup", lookup_id = %ctx.id, subject = %ctx.subject);
        self.drive(ctx).instrument(span).await
    }

    async fn drive(&self, ctx: LookupContext) -> LookupState {
        self.abort_side_channel();
        let side = self.spawn_side_channel(&ctx);
        let subject = ctx.subject.value().to_string();

        tracing::info!(kind = ?ctx.subject.kind(), "Lookup started");
        self.state_tx.send_replace(LookupState::LoadingBalances {
            ctx: ctx.clone(),
            progress: BALANCES_START,
        });

        let balances = match self
            .stage(ctx.id, CONTRACT_INFO_START, self.source.token_balances(&subject))
            .await
        {
            Ok(balances) => {
                let total = balances.len();
                let kept = filter_balances(balances, self.min_usd_value);
                tracing::debug!(total, kept = kept.len(), "Token balances filtered");
                kept
            }
            Err(e) => return self.fail(ctx, e.to_string()),
        };

        self.transition(LookupState::LoadingContractInfo {
            ctx: ctx.clone(),
            progress: CONTRACT_INFO_START,
            balances: balances.clone(),
        });

        let address = match self
            .stage(ctx.id, SCORE_START, self.source.address_info(&subject))
            .await
        {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(error = %e, "Address info unavailable");
                return self.fail(ctx, ProviderError::NoData.to_string());
            }
        };

        if address.is_contract {
            tracing::info!("Subject is a contract, skipping score lookup");
            let report = LookupReport {
                balances,
                address,
                score: None,
                socials: None,
                platform_identity: None,
            };
            return self.finish(ctx, report, side).await;
        }

        self.transition(LookupState::LoadingScore {
            ctx: ctx.clone(),
            progress: SCORE_START,
            balances: balances.clone(),
            address: address.clone(),
        });

        let score = match self
            .stage(ctx.id, COMPLETE, self.source.builder_score(&subject))
            .await
        {
            Ok(score) => score,
            Err(e) => return self.fail(ctx, e.to_string()),
        };

        let socials = match self.stage(ctx.id, COMPLETE, self.source.socials(&subject)).await {
            Ok(socials) => Some(filter_socials(socials, &self.excluded_social_sources)),
            Err(e) => {
                tracing::warn!(error = %e, "Social lookup failed, continuing without socials");
                None
            }
        };

        let report = LookupReport {
            balances,
            address,
            score,
            socials,
            platform_identity: None,
        };
        self.finish(ctx, report, side).await
    }

    /// Await a provider call, ticking progress toward `ceiling` meanwhile.
    async fn stage<T>(&self, id: Uuid, ceiling: u8, call: impl Future<Output = T>) -> T {
        let Some(period) = self.ticker.interval else {
            return call.await;
        };

        tokio::pin!(call);
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                out = &mut call => return out,
                _ = ticks.tick() => self.tick(id, ceiling),
            }
        }
    }

    fn tick(&self, id: Uuid, ceiling: u8) {
        let ticker = self.ticker;
        self.state_tx.send_if_modified(|state| {
            if state.lookup_id() != Some(id) || !state.is_loading() {
                return false;
            }
            match ticker.advance(state.progress(), ceiling) {
                Some(progress) => {
                    *state = state.with_progress(progress);
                    true
                }
                None => false,
            }
        });
    }

    /// Publish `next` unless a newer lookup has taken over.
    fn transition(&self, next: LookupState) -> bool {
        let id = next.lookup_id();
        self.state_tx.send_if_modified(move |state| {
            if state.lookup_id() != id {
                return false;
            }
            *state = next;
            true
        })
    }

    fn fail(&self, ctx: LookupContext, message: String) -> LookupState {
        tracing::warn!(error = %message, "Lookup failed");
        self.abort_side_channel();
        metrics::record_lookup("error");

        let state = LookupState::Error { ctx, message };
        self.transition(state.clone());
        state
    }

    async fn finish(
        &self,
        ctx: LookupContext,
        mut report: LookupReport,
        side: Option<SideChannel>,
    ) -> LookupState {
        match side {
            Some(handle) if handle.is_finished() => {
                report.platform_identity = side_channel_result(handle.await);
            }
            Some(handle) => self.merge_later(ctx.id, handle),
            None => {}
        }

        tracing::info!(
            balances = report.balances.len(),
            score = ?report.score,
            is_contract = report.address.is_contract,
            "Lookup complete"
        );
        metrics::record_lookup("done");

        let state = LookupState::Done { ctx, report };
        self.transition(state.clone());
        state
    }

    fn spawn_side_channel(&self, ctx: &LookupContext) -> Option<SideChannel> {
        let username = ctx.subject.farcaster_username()?;
        tracing::debug!(username = %username, "Starting Farcaster side lookup");

        let source = Arc::clone(&self.source);
        let handle = tokio::spawn(
            async move { source.farcaster_user(&username).await }.in_current_span(),
        );
        self.track_side_task(handle.abort_handle());
        Some(handle)
    }

    /// Merge the side channel into the published `Done` state once it resolves.
    fn merge_later(&self, id: Uuid, handle: SideChannel) {
        let state_tx = Arc::clone(&self.state_tx);
        let merge = tokio::spawn(
            async move {
                let Some(identity) = side_channel_result(handle.await) else {
                    return;
                };
                let merged = state_tx.send_if_modified(|state| match state {
                    LookupState::Done { ctx, report } if ctx.id == id => {
                        report.platform_identity = Some(identity);
                        true
                    }
                    _ => false,
                });
                if merged {
                    tracing::debug!("Farcaster identity merged after completion");
                }
            }
            .in_current_span(),
        );
        self.track_side_task(merge.abort_handle());
    }

    fn abort_side_channel(&self) {
        for task in self.lock_side_tasks().drain(..) {
            task.abort();
        }
    }

    fn track_side_task(&self, task: AbortHandle) {
        self.lock_side_tasks().push(task);
    }

    fn lock_side_tasks(&self) -> std::sync::MutexGuard<'_, Vec<AbortHandle>> {
        self.side_tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for LookupPipeline {
    fn drop(&mut self) {
        self.abort_side_channel();
    }
}

fn side_channel_result(
    result: Result<ProviderResult<Option<SocialIdentity>>, JoinError>,
) -> Option<SocialIdentity> {
    match result {
        Ok(Ok(identity)) => identity,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Farcaster side lookup failed");
            None
        }
        Err(e) => {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "Farcaster side lookup panicked");
            }
            None
        }
    }
}
