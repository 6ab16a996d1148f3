//! Lookup pipeline subsystem.
//!
//! # Data Flow
//! ```text
//! Subject (subject.rs)
//!     → engine.rs
//!         token balances ──▶ address info ──┬─ contract ──────────────▶ Done
//!                                           └─ not contract ─▶ score ─▶ socials ─▶ Done
//!         (any failing stage ─▶ Error)
//!     → state.rs (LookupState published through a watch channel)
//!
//! Origin page is a Farcaster profile:
//!     → side channel task ─▶ merged into Done when it resolves
//! ```
//!
//! # Design Decisions
//! - Stage N's request is issued only after stage N-1's response
//! - Social and side-channel failures degrade to "absent"
//! - Progress is display-only (progress.rs)

pub mod engine;
pub mod progress;
pub mod state;
pub mod subject;

pub use engine::LookupPipeline;
pub use state::{LookupContext, LookupReport, LookupState};
pub use subject::{Subject, SubjectError, SubjectKind};
