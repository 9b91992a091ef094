//! Route handlers and handler output coercion.

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::http::{Request, Response};
use crate::routing::Params;

/// Something a route can invoke to produce a response.
pub trait RouteHandler: Send + Sync {
    fn call(&self, request: &Request, params: &Params) -> Result<HandlerOutput, HandlerError>;
}

/// Adapter turning a closure into a [`RouteHandler`].
pub struct HandlerFn<F>(F);

impl<F> RouteHandler for HandlerFn<F>
where
    F: Fn(&Request, &Params) -> Result<HandlerOutput, HandlerError> + Send + Sync,
{
    fn call(&self, request: &Request, params: &Params) -> Result<HandlerOutput, HandlerError> {
        (self.0)(request, params)
    }
}

pub(crate) fn boxed_handler<F, O>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(&Request, &Params) -> Result<O, HandlerError> + Send + Sync + 'static,
    O: Into<HandlerOutput>,
{
    Arc::new(HandlerFn(
        move |request: &Request, params: &Params| -> Result<HandlerOutput, HandlerError> {
            f(request, params).map(Into::into)
        },
    ))
}

/// Wrap a closure as an inline [`Handler`].
///
/// ```
/// use site_router::http::handler_fn;
///
/// let handler = handler_fn(|_request, params| {
///     Ok(format!("post {}", params.get("id").unwrap_or("?")))
/// });
/// ```
pub fn handler_fn<F, O>(f: F) -> Handler
where
    F: Fn(&Request, &Params) -> Result<O, HandlerError> + Send + Sync + 'static,
    O: Into<HandlerOutput>,
{
    Handler::Inline(boxed_handler(f))
}

/// A route's handler: either inline, or a name resolved at dispatch time.
#[derive(Clone)]
pub enum Handler {
    Inline(Arc<dyn RouteHandler>),
    /// e.g. `"health"` or `"PostController@show"`.
    Named(String),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Handler::Inline(..)"),
            Handler::Named(name) => write!(f, "Handler::Named({name:?})"),
        }
    }
}

impl From<&str> for Handler {
    fn from(name: &str) -> Self {
        Handler::Named(name.to_string())
    }
}

impl From<String> for Handler {
    fn from(name: String) -> Self {
        Handler::Named(name)
    }
}

impl From<Arc<dyn RouteHandler>> for Handler {
    fn from(handler: Arc<dyn RouteHandler>) -> Self {
        Handler::Inline(handler)
    }
}

/// What a handler may return. Everything except `Response` becomes a 200.
#[derive(Debug, Clone)]
pub enum HandlerOutput {
    Empty,
    Text(String),
    Json(serde_json::Value),
    Response(Response),
}

impl HandlerOutput {
    pub fn into_response(self) -> Response {
        match self {
            HandlerOutput::Empty => Response::new(axum::http::StatusCode::OK),
            HandlerOutput::Text(body) => Response::text(body),
            HandlerOutput::Json(value) => Response::json(&value),
            HandlerOutput::Response(response) => response,
        }
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        HandlerOutput::Empty
    }
}

impl From<&str> for HandlerOutput {
    fn from(body: &str) -> Self {
        HandlerOutput::Text(body.to_string())
    }
}

impl From<String> for HandlerOutput {
    fn from(body: String) -> Self {
        HandlerOutput::Text(body)
    }
}

impl From<serde_json::Value> for HandlerOutput {
    fn from(value: serde_json::Value) -> Self {
        HandlerOutput::Json(value)
    }
}

impl From<Response> for HandlerOutput {
    fn from(response: Response) -> Self {
        HandlerOutput::Response(response)
    }
}
