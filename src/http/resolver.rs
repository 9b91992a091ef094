//! Resolution of named handler and middleware references.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::http::handler::{boxed_handler, HandlerOutput, RouteHandler};
use crate::http::middleware::{boxed_middleware, Middleware, Next};
use crate::http::{Request, Response};
use crate::routing::Params;

/// Host-supplied capability that turns names into callables.
pub trait Resolver: Send + Sync {
    fn handler(&self, name: &str) -> Option<Arc<dyn RouteHandler>>;
    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>>;
}

/// Map-backed [`Resolver`].
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn RouteHandler>>,
    middleware: HashMap<String, Arc<dyn Middleware>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_handler<F, O>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Request, &Params) -> Result<O, HandlerError> + Send + Sync + 'static,
        O: Into<HandlerOutput>,
    {
        self.insert_handler(name, boxed_handler(f))
    }

    pub fn register_middleware<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut Request, Next<'_>) -> Result<Response, HandlerError> + Send + Sync + 'static,
    {
        self.insert_middleware(name, boxed_middleware(f))
    }

    pub fn insert_handler(&mut self, name: impl Into<String>, handler: Arc<dyn RouteHandler>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn insert_middleware(&mut self, name: impl Into<String>, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.insert(name.into(), middleware);
        self
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware.contains_key(name)
    }
}

impl Resolver for Registry {
    fn handler(&self, name: &str) -> Option<Arc<dyn RouteHandler>> {
        self.handlers.get(name).cloned()
    }

    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.middleware.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_registered_names() {
        let mut registry = Registry::new();
        registry
            .register_handler("PostController@show", |_req, params| {
                Ok(format!("post {}", params.get("id").unwrap_or("?")))
            })
            .register_middleware("pass", |req, next| next.run(req));

        assert!(registry.has_handler("PostController@show"));
        assert!(registry.has_middleware("pass"));
        assert!(registry.handler("missing").is_none());

        let handler = registry.handler("PostController@show").unwrap();
        let request = Request::create("GET", "/posts/3").unwrap();
        let output = handler.call(&request, &Params::from([("id", "3")])).unwrap();
        assert_eq!(output.into_response().body_text(), "post 3");
    }
}
