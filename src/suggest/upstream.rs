//! Upstream suggestion API client.
//!
//! # Responsibilities
//! - Build the upstream URI from the fixed base URL and re-serialized query
//! - Bound concurrent outbound connections with a semaphore
//! - Issue the GET and hand back the unread, streaming response
//!
//! # Design Decisions
//! - No client headers are forwarded, so the upstream answers uncompressed
//! - No retries; connection failures surface once as `UpstreamError`
//! - One deadline covers the slot wait and the wait for response headers,
//!   so a stalled upstream yields `UpstreamError::Timeout`
//! - The connection permit travels with the response body and is released
//!   when the body finishes or is dropped

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, uri::InvalidUri, Method, Request, Response, Uri};
use bytes::Bytes;
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::UpstreamConfig;
use crate::suggest::params::QueryParams;

/// Errors reaching the upstream. HTTP error statuses are not errors here.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream URI: {0}")]
    InvalidUri(#[from] InvalidUri),

    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("upstream connection limiter closed")]
    LimiterClosed,

    #[error("upstream did not respond within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{}", describe_chain(.0))]
    Connect(#[from] hyper_util::client::legacy::Error),
}

/// Render an error and its sources as `outer: inner: root`.
fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// A live upstream response plus the connection slot it occupies.
pub struct UpstreamResponse {
    pub response: Response<Incoming>,
    pub permit: OwnedSemaphorePermit,
}

/// Shared client for the upstream suggestion API.
pub struct UpstreamClient {
    client: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
    response_timeout: Duration,
}

impl UpstreamClient {
    /// Create a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.max_connections)
            .build(connector);

        Self {
            client,
            base_url: config.base_url.trim_end_matches('?').to_string(),
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        }
    }

    /// Full upstream URI for a query.
    pub fn build_uri(&self, params: &QueryParams) -> Result<Uri, UpstreamError> {
        let uri = format!("{}?{}", self.base_url, params.to_query_string());
        Ok(Uri::try_from(uri)?)
    }

    /// Open the upstream request. Waits for a free connection slot first.
    pub async fn fetch(&self, params: &QueryParams) -> Result<UpstreamResponse, UpstreamError> {
        let uri = self.build_uri(params)?;

        tokio::time::timeout(self.response_timeout, self.send(uri))
            .await
            .map_err(|_| UpstreamError::Timeout(self.response_timeout))?
    }

    async fn send(&self, uri: Uri) -> Result<UpstreamResponse, UpstreamError> {
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| UpstreamError::LimiterClosed)?;

        tracing::trace!(
            uri = %uri,
            available_permits = self.connection_limit.available_permits(),
            "Upstream connection slot acquired"
        );

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "*/*")
            .body(Empty::<Bytes>::new())?;

        let response = self.client.request(request).await?;

        Ok(UpstreamResponse { response, permit })
    }

    /// Free outbound connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    /// Configured outbound connection limit.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// The base URL queries are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
