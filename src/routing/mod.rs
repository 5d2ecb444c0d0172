//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (dispatch)
//!     → matcher.rs (exact path comparison)
//!     → Return: RouteTarget::Forward or RouteTarget::Static
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same path always yields same target

pub mod matcher;
pub mod router;

pub use router::{RouteTarget, Router};
