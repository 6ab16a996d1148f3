//! Wallet Reputation Explorer
//!
//! Looks up a wallet address or name and prints what the configured
//! providers know about it.
//!
//! # Architecture Overview
//!
//! ```text
//!   lookup <subject>        watch (inbox file)
//!          │                       │
//!          └──────────┬────────────┘
//!                     ▼
//!               ┌───────────┐   remembers subject   ┌───────────┐
//!               │  session  │──────────────────────▶│ key store │
//!               └─────┬─────┘                       └─────┬─────┘
//!                     ▼                                   │ credentials
//!               ┌───────────┐     ┌──────────────────┐    │
//!               │ pipeline  │────▶│ provider client  │◀───┘
//!               └─────┬─────┘     └──────────────────┘
//!                     │ watch channel        │ Blockscout / Dune Sim /
//!                     ▼                      │ Talent Protocol / Neynar
//!               ┌───────────┐                ▼
//!               │   panel   │            upstream APIs
//!               └───────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};

use reputation_explorer::config::{load_or_default, ExplorerConfig};
use reputation_explorer::lifecycle::{signals, Shutdown};
use reputation_explorer::observability::{logging, metrics};
use reputation_explorer::panel;
use reputation_explorer::session::{InboxWatcher, Session, SubjectEvent};
use reputation_explorer::store::{CredentialStore, KvStore};
use reputation_explorer::LookupState;

#[derive(Parser)]
#[command(name = "reputation-explorer")]
#[command(about = "Aggregate reputation signals for a wallet address or name", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one subject (defaults to the last one looked up)
    Lookup {
        subject: Option<String>,

        /// Page the subject was picked from
        #[arg(long)]
        origin: Option<String>,

        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up every subject written to the inbox file
    Watch {
        /// Inbox file (overrides the configured path)
        #[arg(long)]
        inbox: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("reputation-explorer v{} starting", env!("CARGO_PKG_VERSION"));

    let store = CredentialStore::new(KvStore::open(&config.store.path)?);
    let session = Session::from_config(&config, store)?;

    match cli.command {
        Commands::Lookup { subject, origin, json } => {
            lookup(&session, subject, origin, json).await?;
        }
        Commands::Watch { inbox } => {
            watch_inbox(&session, &config, inbox).await?;
        }
    }

    Ok(())
}

async fn lookup(
    session: &Session,
    subject: Option<String>,
    origin: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let event = match subject {
        Some(subject) => SubjectEvent::manual(subject, origin),
        None => match session.resume() {
            Some(last) => {
                SubjectEvent::manual(last.value(), last.origin_url().map(str::to_string))
            }
            None => return Err("no subject given and none remembered".into()),
        },
    };

    let renderer = (!json).then(|| tokio::spawn(render_progress(session.subscribe())));
    let state = session.submit(event).await?;
    if let Some(renderer) = renderer {
        renderer.abort();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", panel::render(&state));
    }

    if matches!(state, LookupState::Error { .. }) {
        std::process::exit(1);
    }
    Ok(())
}

async fn watch_inbox(
    session: &Session,
    config: &ExplorerConfig,
    inbox: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let shutdown = Shutdown::new();
    signals::shutdown_on_ctrl_c(shutdown.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let path = inbox.unwrap_or_else(|| PathBuf::from(&config.inbox.path));
    let _watcher = InboxWatcher::new(&path, tx).run()?;

    if let Some(last) = session.resume() {
        tracing::info!(subject = %last, "Remembered subject available");
    }

    let renderer = tokio::spawn(render_states(session.subscribe()));
    session.run(rx, shutdown.subscribe()).await;
    renderer.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Redraw the progress line on stderr while a lookup runs.
async fn render_progress(mut states: watch::Receiver<LookupState>) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        if state.is_loading() {
            eprint!("\r{}", panel::progress_line(&state));
        } else {
            eprintln!();
        }
    }
}

/// Print every terminal state as it is published.
async fn render_states(mut states: watch::Receiver<LookupState>) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        if state.is_terminal() {
            println!("{}", panel::render(&state));
        }
    }
}
