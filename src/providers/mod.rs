//! External data clients.
//!
//! # Data Flow
//! ```text
//! subject
//!     → client.rs (endpoint URL, credential header, GET, status policy)
//!     → projection.rs (JSON body → narrow data shape)
//!     → sources.rs (LookupSource: the calls the pipeline makes)
//! ```
//!
//! # Design Decisions
//! - One client for every provider; providers differ only by endpoint
//!   config and projector
//! - Missing credential fails before any network I/O
//! - Address info reports non-success statuses as "no data"; the other
//!   providers surface them as upstream errors
//! - No automatic retries

pub mod client;
pub mod projection;
pub mod sources;
pub mod types;

pub use client::ProviderClient;
pub use sources::LookupSource;
pub use types::{
    AddressInfo, ProviderError, ProviderKind, ProviderResult, SocialIdentity, TokenBalance,
};
