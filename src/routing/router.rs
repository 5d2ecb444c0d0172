//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the compiled suggestion-endpoint matcher
//! - Decide between forwarding upstream and serving static files
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exactly two outcomes; no NoMatch, static serving is the default

use axum::body::Body;
use axum::http::Request;

use crate::config::SuggestConfig;
use crate::routing::matcher::{ExactPathMatcher, Matcher};

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Proxy to the upstream suggestion API.
    Forward,
    /// Hand to the static file server.
    Static,
}

/// Request router.
#[derive(Debug)]
pub struct Router {
    suggest: ExactPathMatcher,
}

impl Router {
    /// Build a router for the given endpoint path.
    pub fn new(endpoint_path: impl Into<String>) -> Self {
        Self {
            suggest: ExactPathMatcher::new(endpoint_path),
        }
    }

    /// Build from configuration.
    pub fn from_config(config: &SuggestConfig) -> Self {
        Self::new(config.endpoint_path.clone())
    }

    /// Pick the target for a request.
    pub fn dispatch(&self, req: &Request<Body>) -> RouteTarget {
        if self.suggest.matches(req) {
            RouteTarget::Forward
        } else {
            RouteTarget::Static
        }
    }

    /// The forwarded endpoint path.
    pub fn endpoint_path(&self) -> &str {
        self.suggest.path()
    }
}
