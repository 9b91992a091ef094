//! Error types shared across the routing engine and its hosts.
//!
//! # Design Decisions
//! - Registration and URL generation failures are `RouterError`
//! - A request that matches nothing is NOT an error (it becomes a 404)
//! - Handler failures travel untouched inside `DispatchError::Handler`

use thiserror::Error;

/// Error type returned by route handlers and middleware.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while registering routes or generating URLs.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid method set for route `{uri}`: {reason}")]
    InvalidMethod { uri: String, reason: String },

    #[error("no route named `{name}`")]
    RouteNotFound { name: String },

    #[error("route `{route}` requires parameter `{parameter}`")]
    MissingParameter { route: String, parameter: String },

    #[error("value `{value}` for parameter `{parameter}` of route `{route}` violates its constraint")]
    InvalidParameter {
        route: String,
        parameter: String,
        value: String,
    },

    #[error("route name `{name}` is already taken")]
    DuplicateRouteName { name: String },
}

/// Errors raised while dispatching a request to a matched route.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("handler `{0}` is not registered with the resolver")]
    UnresolvedHandler(String),

    #[error("middleware `{0}` is not registered with the resolver")]
    UnresolvedMiddleware(String),

    #[error("handler failed: {0}")]
    Handler(HandlerError),
}

/// Errors raised by the host integration while processing a request.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to send response: {0}")]
    Emit(#[source] std::io::Error),
}

/// Errors raised while building a [`Request`](crate::http::Request).
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request method: {0}")]
    Method(#[from] axum::http::method::InvalidMethod),

    #[error("invalid request uri: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),
}

/// Errors raised by a host front-end while serving a request.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
