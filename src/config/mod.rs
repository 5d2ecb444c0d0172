//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides applied in main, validated again
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer, which builds the upstream client and router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the proxy runs with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, StaticFilesConfig,
    SuggestConfig, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
