//! Route model and the registration handle returned by `map`.

use axum::http::Method;

use crate::error::RouterError;
use crate::http::{Handler, MiddlewareRef};
use crate::routing::pattern::RoutePattern;
use crate::routing::Router;

/// Position of a route in its router's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A method set + compiled pattern + handler binding.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) methods: Vec<Method>,
    pub(crate) uri: String,
    pub(crate) pattern: RoutePattern,
    pub(crate) handler: Handler,
    pub(crate) name: Option<String>,
    pub(crate) middleware: Vec<MiddlewareRef>,
}

impl Route {
    pub(crate) fn new(
        methods: Vec<Method>,
        uri: String,
        handler: Handler,
        middleware: Vec<MiddlewareRef>,
    ) -> Result<Self, RouterError> {
        let pattern = RoutePattern::compile(&uri)?;
        Ok(Self {
            methods,
            uri,
            pattern,
            handler,
            name: None,
            middleware,
        })
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// The URI pattern as registered (group prefixes included).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Middleware in execution order: group middleware (outermost group
    /// first), then route middleware.
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }
}

/// Parse method names, upper-casing them and dropping repeats.
pub(crate) fn parse_methods<I, M>(uri: &str, methods: I) -> Result<Vec<Method>, RouterError>
where
    I: IntoIterator<Item = M>,
    M: AsRef<str>,
{
    let mut parsed: Vec<Method> = Vec::new();
    for method in methods {
        let raw = method.as_ref().trim().to_ascii_uppercase();
        let method = Method::from_bytes(raw.as_bytes()).map_err(|_| RouterError::InvalidMethod {
            uri: uri.to_string(),
            reason: format!("`{raw}` is not a valid HTTP method"),
        })?;
        if !parsed.contains(&method) {
            parsed.push(method);
        }
    }

    if parsed.is_empty() {
        return Err(RouterError::InvalidMethod {
            uri: uri.to_string(),
            reason: "no methods given".to_string(),
        });
    }
    Ok(parsed)
}

/// Borrowed handle to a freshly registered route, for chained setup.
pub struct RouteHandle<'r> {
    router: &'r mut Router,
    id: RouteId,
}

impl<'r> RouteHandle<'r> {
    pub(crate) fn new(router: &'r mut Router, id: RouteId) -> Self {
        Self { router, id }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn route(&self) -> &Route {
        self.router.route_ref(self.id)
    }

    pub fn methods(&self) -> &[Method] {
        self.route().methods()
    }

    pub fn uri(&self) -> &str {
        self.route().uri()
    }

    /// Name the route for URL generation. Fails if another route already
    /// holds the name.
    pub fn name(self, name: impl Into<String>) -> Result<Self, RouterError> {
        self.router.assign_name(self.id, name.into())?;
        Ok(self)
    }

    /// Append a middleware; it runs after any group middleware.
    pub fn middleware(self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.router.route_mut(self.id).middleware.push(middleware.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_methods_uppercases_and_dedupes() {
        let methods = parse_methods("/x", ["get", "GET", "post"]).unwrap();
        assert_eq!(methods, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn test_parse_methods_rejects_empty_set() {
        let err = parse_methods("/x", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, RouterError::InvalidMethod { .. }));
    }

    #[test]
    fn test_parse_methods_rejects_bad_token() {
        assert!(parse_methods("/x", ["GE T"]).is_err());
    }
}
