//! Wallet reputation explorer library.
//!
//! Looks up an address or name against several third-party APIs (Blockscout,
//! Dune Sim, Talent Protocol, Neynar) and aggregates the results.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod panel;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod store;

pub use config::ExplorerConfig;
pub use lifecycle::Shutdown;
pub use pipeline::{LookupPipeline, LookupState, Subject};
pub use session::{Session, SubjectEvent};
pub use store::CredentialStore;
