//! Streaming response transformation.
//!
//! The upstream body is wrapped, never collected. Each data frame is rewritten
//! as it is polled, so the client socket drives upstream reads and at most one
//! chunk is in memory per request. Dropping the client body drops the upstream
//! body with it, which closes the upstream connection.

use std::time::Instant;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Response};
use http_body_util::BodyExt;
use hyper::body::{Frame, Incoming};
use tokio::sync::OwnedSemaphorePermit;

use crate::observability::metrics;
use crate::suggest::rewrite::RewritePolicy;
use crate::suggest::RequestPhase;

/// Headers that describe one hop and are never copied to the client.
static HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove(header::UPGRADE);
}

/// Lives as long as the client body. Dropping it closes the request.
struct StreamGuard {
    request_id: String,
    policy: RewritePolicy,
    started: Instant,
    chunks: u64,
    _permit: OwnedSemaphorePermit,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        tracing::trace!(
            request_id = %self.request_id,
            phase = ?RequestPhase::Closed,
            chunks = self.chunks,
            "Suggestion stream closed"
        );
        metrics::record_request_duration(self.policy, self.started);
    }
}

/// Mirror the upstream status and headers, rewriting body chunks with `policy`.
pub fn transform_response(
    upstream: Response<Incoming>,
    policy: RewritePolicy,
    permit: OwnedSemaphorePermit,
    request_id: &str,
    started: Instant,
) -> Response<Body> {
    let (mut parts, body) = upstream.into_parts();

    strip_hop_by_hop(&mut parts.headers);
    if policy.is_active() {
        parts.headers.remove(header::CONTENT_LENGTH);
    }

    tracing::trace!(
        request_id = %request_id,
        phase = ?RequestPhase::Streaming,
        status = %parts.status,
        policy = ?policy,
        "Streaming upstream response"
    );

    let mut guard = StreamGuard {
        request_id: request_id.to_string(),
        policy,
        started,
        chunks: 0,
        _permit: permit,
    };

    let body = body.map_frame(move |frame: Frame<bytes::Bytes>| match frame.into_data() {
        Ok(chunk) => {
            guard.chunks += 1;
            let (chunk, strategy) = policy.apply(chunk);
            metrics::record_chunk(strategy);
            tracing::trace!(
                request_id = %guard.request_id,
                chunk = guard.chunks,
                len = chunk.len(),
                strategy = strategy.as_str(),
                "Forwarding chunk"
            );
            Frame::data(chunk)
        }
        Err(frame) => frame,
    });

    Response::from_parts(parts, Body::new(body))
}
