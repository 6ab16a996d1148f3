//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ExplorerConfig (validated, immutable)
//!     → passed explicitly into the store, clients and pipeline
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::EndpointConfig;
pub use schema::ExplorerConfig;
pub use schema::InboxConfig;
pub use schema::ObservabilityConfig;
pub use schema::PipelineConfig;
pub use schema::ProvidersConfig;
pub use schema::StoreConfig;
pub use schema::TimeoutConfig;
