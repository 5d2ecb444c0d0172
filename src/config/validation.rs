//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limits > 0)
//! - Check the upstream base URL is a usable plain-HTTP URL with no query
//! - Keep the upstream deadline inside the request deadline
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("upstream.base_url is invalid: {0}")]
    InvalidUpstreamUrl(String),

    #[error("upstream.base_url must use http, got {0}")]
    UnsupportedUpstreamScheme(String),

    #[error("upstream.base_url must not carry a query string or fragment, got {0:?}")]
    UpstreamUrlHasQuery(String),

    #[error("upstream.max_connections must be greater than zero")]
    ZeroUpstreamConnections,

    #[error("upstream.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("upstream.response_timeout_secs must be greater than zero")]
    ZeroResponseTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("upstream.response_timeout_secs ({response}) must be less than timeouts.request_secs ({request})")]
    ResponseTimeoutNotBelowRequest { response: u64, request: u64 },

    #[error("suggest.endpoint_path must start with '/', got {0:?}")]
    RelativeEndpointPath(String),

    #[error("static_files.root must not be empty")]
    EmptyStaticRoot,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() != "http" => {
            errors.push(ValidationError::UnsupportedUpstreamScheme(url.scheme().to_string()));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::InvalidUpstreamUrl("missing host".to_string()));
        }
        // A bare trailing `?` is trimmed by the client; anything after it is not.
        Ok(url)
            if url.query().is_some_and(|q| !q.is_empty()) || url.fragment().is_some() =>
        {
            errors.push(ValidationError::UpstreamUrlHasQuery(
                config.upstream.base_url.clone(),
            ));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl(e.to_string())),
    }

    if config.upstream.max_connections == 0 {
        errors.push(ValidationError::ZeroUpstreamConnections);
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.upstream.response_timeout_secs == 0 {
        errors.push(ValidationError::ZeroResponseTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    } else if config.upstream.response_timeout_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::ResponseTimeoutNotBelowRequest {
            response: config.upstream.response_timeout_secs,
            request: config.timeouts.request_secs,
        });
    }
    if !config.suggest.endpoint_path.starts_with('/') {
        errors.push(ValidationError::RelativeEndpointPath(
            config.suggest.endpoint_path.clone(),
        ));
    }
    if config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::EmptyStaticRoot);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
