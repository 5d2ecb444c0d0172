//! Suggestion proxy: forward, then restore the bang on every suggestion.
//!
//! # Data Flow
//! ```text
//! query string
//!     → params.rs (QueryParams, bang flag, response format)
//!     → upstream.rs (connection slot, GET to the provider)
//!     → stream.rs (mirror status + headers, wrap body)
//!     → rewrite.rs (per-chunk marker insertion)
//!     → client
//! ```
//!
//! # Request Phases
//! ```text
//! Idle → Parsed → UpstreamPending → Streaming → Closed
//!                               └──→ Errored → Closed
//! ```

pub mod params;
pub mod rewrite;
pub mod stream;
pub mod upstream;

use std::time::Instant;

use axum::body::Body;
use axum::http::Response;

use crate::http::response;
use crate::observability::metrics;

pub use params::{QueryParams, ResponseFormat, SuggestRequest, MARKER};
pub use rewrite::{RewritePolicy, Strategy};
pub use upstream::{UpstreamClient, UpstreamError, UpstreamResponse};

/// Lifecycle of one suggestion request. Each request walks it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Parsed,
    UpstreamPending,
    Streaming,
    Errored,
    Closed,
}

/// Proxy one suggestion request.
///
/// Never fails: a connection-level upstream failure becomes a 500 response,
/// anything the upstream answers is streamed back.
pub async fn forward(
    upstream: &UpstreamClient,
    query: Option<&str>,
    request_id: &str,
) -> Response<Body> {
    let started = Instant::now();
    tracing::trace!(request_id = %request_id, phase = ?RequestPhase::Idle, "Suggestion request received");

    let request = SuggestRequest::parse(query);
    let policy = RewritePolicy::for_request(&request);

    tracing::debug!(
        request_id = %request_id,
        phase = ?RequestPhase::Parsed,
        q = %request.params.q,
        client = %request.params.client(),
        bang = request.bang,
        format = ?request.format,
        "Suggestion query parsed"
    );

    tracing::trace!(request_id = %request_id, phase = ?RequestPhase::UpstreamPending, "Contacting upstream");

    match upstream.fetch(&request.params).await {
        Ok(UpstreamResponse { response, permit }) => {
            metrics::record_upstream_status(policy, response.status().as_u16());
            stream::transform_response(response, policy, permit, request_id, started)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                phase = ?RequestPhase::Errored,
                error = %e,
                "Upstream error"
            );
            metrics::record_upstream_error();
            metrics::record_request_duration(policy, started);
            let response = response::upstream_error(&e);
            tracing::trace!(request_id = %request_id, phase = ?RequestPhase::Closed, "Error response sent");
            response
        }
    }
}
