//! Key store subsystem.
//!
//! # Data Flow
//! ```text
//! explorer-admin (set/clear)      session (remember subject)
//!     → credentials.rs (slot naming, provider → slot mapping)
//!     → kv.rs (in-memory map, rewritten to JSON on every mutation)
//!
//! provider client (before each request)
//!     → credentials.rs get(provider)
//! ```
//!
//! # Design Decisions
//! - Plaintext JSON file; no encryption, no expiry
//! - Last write wins; values only cleared by explicit user action
//! - Read-only during a lookup

pub mod credentials;
pub mod kv;

pub use credentials::{CredentialSlot, CredentialStore};
pub use kv::{KvStore, StoreError, StoreResult};
