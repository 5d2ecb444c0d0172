//! Bang-preserving autocomplete proxy.
//!
//! Forwards `/complete/search` to an upstream suggestion API and, when the
//! query starts with `!`, puts the `!` back on every suggestion while the
//! response streams through. Every other path is served from a static
//! directory.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod suggest;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
