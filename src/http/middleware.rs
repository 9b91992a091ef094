//! Route middleware.
//!
//! A middleware receives the request and a [`Next`] continuation. Calling
//! `next.run(request)` hands control to the rest of the chain and finally
//! to the route handler; returning without calling it short-circuits.

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::http::{Request, Response};
use crate::routing::Params;

pub trait Middleware: Send + Sync {
    fn handle(&self, request: &mut Request, next: Next<'_>) -> Result<Response, HandlerError>;
}

type Endpoint<'a> = dyn Fn(&Request) -> Result<Response, HandlerError> + 'a;

/// The remainder of a middleware chain.
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    params: &'a Params,
    endpoint: &'a Endpoint<'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], params: &'a Params, endpoint: &'a Endpoint<'a>) -> Self {
        Self {
            chain,
            params,
            endpoint,
        }
    }

    /// Parameters extracted for the matched route.
    pub fn params(&self) -> &Params {
        self.params
    }

    pub fn run(self, request: &mut Request) -> Result<Response, HandlerError> {
        match self.chain.split_first() {
            Some((first, rest)) => first.handle(request, Next { chain: rest, ..self }),
            None => (self.endpoint)(&*request),
        }
    }
}

/// Adapter turning a closure into a [`Middleware`].
pub struct MiddlewareFn<F>(F);

impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(&mut Request, Next<'_>) -> Result<Response, HandlerError> + Send + Sync,
{
    fn handle(&self, request: &mut Request, next: Next<'_>) -> Result<Response, HandlerError> {
        (self.0)(request, next)
    }
}

/// Wrap a closure as an inline [`MiddlewareRef`].
pub fn middleware_fn<F>(f: F) -> MiddlewareRef
where
    F: Fn(&mut Request, Next<'_>) -> Result<Response, HandlerError> + Send + Sync + 'static,
{
    MiddlewareRef::Inline(boxed_middleware(f))
}

pub(crate) fn boxed_middleware<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut Request, Next<'_>) -> Result<Response, HandlerError> + Send + Sync + 'static,
{
    Arc::new(MiddlewareFn(f))
}

/// A middleware attached to a route or group.
#[derive(Clone)]
pub enum MiddlewareRef {
    Inline(Arc<dyn Middleware>),
    Named(String),
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Inline(_) => f.write_str("MiddlewareRef::Inline(..)"),
            MiddlewareRef::Named(name) => write!(f, "MiddlewareRef::Named({name:?})"),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        MiddlewareRef::Named(name.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        MiddlewareRef::Named(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareRef {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        MiddlewareRef::Inline(middleware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn inline(reference: MiddlewareRef) -> Arc<dyn Middleware> {
        match reference {
            MiddlewareRef::Inline(m) => m,
            MiddlewareRef::Named(_) => panic!("expected inline middleware"),
        }
    }

    #[test]
    fn test_chain_runs_in_order_then_endpoint() {
        let outer = inline(middleware_fn(|req, next| {
            req.headers_mut().insert("x-trail", HeaderValue::from_static("outer"));
            next.run(req)
        }));
        let inner = inline(middleware_fn(|req, next| {
            let trail = format!("{},inner", req.headers()["x-trail"].to_str()?);
            req.headers_mut().insert("x-trail", HeaderValue::from_str(&trail)?);
            next.run(req)
        }));
        let chain = vec![outer, inner];
        let params = Params::new();
        let endpoint = |req: &Request| -> Result<Response, HandlerError> {
            Ok(Response::text(req.headers()["x-trail"].to_str()?))
        };

        let mut request = Request::create("GET", "/").unwrap();
        let response = Next::new(&chain, &params, &endpoint).run(&mut request).unwrap();
        assert_eq!(response.body_text(), "outer,inner");
    }

    #[test]
    fn test_short_circuit_skips_endpoint() {
        let guard = inline(middleware_fn(|_req, _next| Ok(Response::new(StatusCode::UNAUTHORIZED))));
        let chain = vec![guard];
        let params = Params::new();
        let endpoint = |_: &Request| -> Result<Response, HandlerError> { panic!("endpoint must not run") };

        let mut request = Request::create("GET", "/").unwrap();
        let response = Next::new(&chain, &params, &endpoint).run(&mut request).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
