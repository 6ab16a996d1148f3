//! Lookup session.
//!
//! A session is one open panel: it owns a pipeline, remembers the last
//! subject in the key store and processes subject events one at a time.
//!
//! # Data Flow
//! ```text
//! CLI argument ─┐
//!               ├─▶ mpsc port ─▶ Session::run ─▶ LookupPipeline::run
//! inbox.rs ─────┘                    │
//!                                    └─▶ CredentialStore::remember_subject
//! ```
//!
//! # Design Decisions
//! - A new event abandons the lookup in flight
//! - Store write failures are logged; the lookup still runs

pub mod event;
pub mod inbox;

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

use crate::config::ExplorerConfig;
use crate::pipeline::{LookupPipeline, LookupState, Subject, SubjectError};
use crate::providers::{LookupSource, ProviderClient};
use crate::store::CredentialStore;

pub use event::{EventSource, SubjectEvent};
pub use inbox::InboxWatcher;

pub struct Session {
    pipeline: LookupPipeline,
    store: CredentialStore,
}

impl Session {
    pub fn new(pipeline: LookupPipeline, store: CredentialStore) -> Self {
        Self { pipeline, store }
    }

    /// Session backed by the HTTP provider client.
    pub fn from_config(
        config: &ExplorerConfig,
        store: CredentialStore,
    ) -> Result<Self, reqwest::Error> {
        let client = ProviderClient::new(config, store.clone())?;
        let source: Arc<dyn LookupSource> = Arc::new(client);
        Ok(Self::new(LookupPipeline::new(source, &config.pipeline), store))
    }

    pub fn pipeline(&self) -> &LookupPipeline {
        &self.pipeline
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.pipeline.subscribe()
    }

    /// Show the remembered subject, if any, without starting a lookup.
    pub fn resume(&self) -> Option<Subject> {
        let subject = self
            .store
            .last_subject()
            .and_then(|(value, origin)| Subject::new(&value, origin.as_deref()).ok());
        self.pipeline.reset(subject.clone());
        subject
    }

    /// Validate and remember an event's subject.
    fn accept(&self, event: &SubjectEvent) -> Result<Subject, SubjectError> {
        let subject = Subject::new(&event.subject, event.origin_url.as_deref())?;
        if let Err(e) = self
            .store
            .remember_subject(subject.value(), subject.origin_url())
        {
            tracing::warn!(error = %e, "Failed to remember subject");
        }
        tracing::debug!(source = ?event.source, subject = %subject, "Subject accepted");
        Ok(subject)
    }

    /// Look up a single event's subject to completion.
    pub async fn submit(&self, event: SubjectEvent) -> Result<LookupState, SubjectError> {
        let subject = self.accept(&event)?;
        Ok(self.pipeline.run(subject).await)
    }

    /// Process events until the port closes or shutdown fires.
    pub async fn run(
        &self,
        mut inbox: mpsc::UnboundedReceiver<SubjectEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut pending: Option<SubjectEvent> = None;

        'session: loop {
            let event = match pending.take() {
                Some(event) => event,
                None => tokio::select! {
                    next = inbox.recv() => match next {
                        Some(event) => event,
                        None => break,
                    },
                    _ = shutdown.recv() => break,
                },
            };

            let subject = match self.accept(&event) {
                Ok(subject) => subject,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring subject event");
                    continue;
                }
            };

            let lookup = self.pipeline.run(subject);
            tokio::pin!(lookup);
            loop {
                tokio::select! {
                    _ = &mut lookup => break,
                    next = inbox.recv() => match next {
                        // Invalid events must not cancel the lookup in flight.
                        Some(event) if !is_valid(&event) => {
                            tracing::warn!(source = ?event.source, "Ignoring empty subject event");
                        }
                        Some(event) => {
                            tracing::info!(subject = %event.subject, "New subject received, abandoning lookup in flight");
                            pending = Some(event);
                            break;
                        }
                        None => {
                            (&mut lookup).await;
                            break 'session;
                        }
                    },
                    _ = shutdown.recv() => break 'session,
                }
            }
        }

        tracing::info!("Session closed");
    }
}

fn is_valid(event: &SubjectEvent) -> bool {
    Subject::new(&event.subject, event.origin_url.as_deref()).is_ok()
}
