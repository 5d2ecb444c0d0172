//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single dispatching handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Dispatch requests to the suggestion proxy or the static file server
//! - Bind server to listener and shut down gracefully

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
use crate::routing::{RouteTarget, Router as SuggestRouter};
use crate::suggest::{self, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SuggestRouter>,
    pub upstream: Arc<UpstreamClient>,
    pub static_files: ServeDir,
}

/// HTTP server for the suggestion proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            router: Arc::new(SuggestRouter::from_config(&config.suggest)),
            upstream: Arc::new(UpstreamClient::new(&config.upstream)),
            static_files: ServeDir::new(&config.static_files.root),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            static_root = %self.config.static_files.root,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The fully layered router, for serving without a listener.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Route every request to the suggestion proxy or the static file server.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response<Body> {
    let request_id = request.request_id().to_string();

    match state.router.dispatch(&request) {
        RouteTarget::Forward => {
            tracing::debug!(
                request_id = %request_id,
                method = %request.method(),
                "Proxying suggestion request"
            );
            let query = request.uri().query().map(str::to_owned);
            suggest::forward(&state.upstream, query.as_deref(), &request_id).await
        }
        RouteTarget::Static => serve_static(state.static_files, request).await,
    }
}

/// Hand the request to the static file collaborator.
async fn serve_static(files: ServeDir, request: Request) -> Response<Body> {
    let result: Result<_, Infallible> = files.oneshot(request).await;
    match result {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
