//! Route table, dispatch, and reverse URL generation.
//!
//! # Responsibilities
//! - Hold routes in registration order and the name index
//! - Strip the base path and find the first matching route
//! - Run the middleware chain and coerce handler output
//! - Build URLs for named routes
//!
//! # Design Decisions
//! - Match is always against the table as currently populated
//! - No match is a plain 404 response, never an error
//! - Named handlers/middleware resolve at dispatch, not registration

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::header::ALLOW;
use axum::http::{HeaderValue, Method, StatusCode};

use crate::error::{DispatchError, HandlerError, RouterError};
use crate::http::{Handler, Middleware, MiddlewareRef, Next, Request, Resolver, Response, RouteHandler};
use crate::routing::group::{GroupRecord, RouteGroup};
use crate::routing::matcher::{self, RouteMatch};
use crate::routing::pattern::{join_paths, BuildError, Params};
use crate::routing::registrar::RouteRegistrar;
use crate::routing::route::{parse_methods, Route, RouteHandle, RouteId};

pub struct Router {
    base_path: String,
    routes: Vec<Route>,
    named: HashMap<String, RouteId>,
    resolver: Option<Arc<dyn Resolver>>,
    method_not_allowed: bool,
}

impl Router {
    pub fn new() -> Self {
        Self {
            base_path: "/".to_string(),
            routes: Vec::new(),
            named: HashMap::new(),
            resolver: None,
            method_not_allowed: false,
        }
    }

    /// Replace the base path. Stored as `/` or `/segment(s)/`.
    pub fn set_base_path(&mut self, path: &str) {
        let trimmed = path.trim().trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        tracing::debug!(base_path = %self.base_path, "Base path set");
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Install the capability used to resolve named handlers and middleware.
    pub fn set_resolver(&mut self, resolver: Arc<dyn Resolver>) {
        self.resolver = Some(resolver);
    }

    pub fn resolver(&self) -> Option<&Arc<dyn Resolver>> {
        self.resolver.as_ref()
    }

    /// Answer 405 + `Allow` instead of 404 when only the method differs.
    pub fn set_method_not_allowed(&mut self, enabled: bool) {
        self.method_not_allowed = enabled;
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub fn named(&self, name: &str) -> Option<&Route> {
        self.named.get(name).and_then(|id| self.route(*id))
    }

    pub(crate) fn register(
        &mut self,
        methods: Vec<Method>,
        uri: String,
        handler: Handler,
        middleware: Vec<MiddlewareRef>,
    ) -> Result<RouteId, RouterError> {
        let route = Route::new(methods, uri, handler, middleware)?;
        tracing::debug!(
            methods = ?route.methods(),
            uri = %route.uri(),
            handler = ?route.handler(),
            "Route registered"
        );
        let id = RouteId(self.routes.len());
        self.routes.push(route);
        Ok(id)
    }

    // Ids are only minted by `register`, so they always index the table.
    pub(crate) fn route_ref(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }

    pub(crate) fn route_mut(&mut self, id: RouteId) -> &mut Route {
        &mut self.routes[id.0]
    }

    pub(crate) fn assign_name(&mut self, id: RouteId, name: String) -> Result<(), RouterError> {
        match self.named.get(&name) {
            Some(existing) if *existing == id => return Ok(()),
            Some(_) => return Err(RouterError::DuplicateRouteName { name }),
            None => {}
        }

        if let Some(previous) = self.routes[id.0].name.take() {
            self.named.remove(&previous);
        }
        self.named.insert(name.clone(), id);
        self.routes[id.0].name = Some(name);
        Ok(())
    }

    /// The request path relative to the base path, or `None` when the path
    /// lies outside it. The base path without its trailing slash maps to `/`.
    pub fn local_path(&self, path: &str) -> Option<String> {
        if self.base_path == "/" {
            return Some(if path.is_empty() { "/".to_string() } else { path.to_string() });
        }
        if let Some(rest) = path.strip_prefix(self.base_path.as_str()) {
            return Some(format!("/{rest}"));
        }
        if path == self.base_path.trim_end_matches('/') {
            return Some("/".to_string());
        }
        None
    }

    /// Look up the first route for `method` and the full request `path`.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match self.local_path(path) {
            Some(local) => matcher::first_match(&self.routes, method, &local),
            None => RouteMatch::NotFound { method_mismatch: false },
        }
    }

    /// Route a request to its handler and produce the response.
    pub fn dispatch(&self, mut request: Request) -> Result<Response, DispatchError> {
        let Some(path) = self.local_path(request.path()) else {
            tracing::debug!(request_id = %request.id(), path = %request.path(), "Outside base path");
            return Ok(Response::not_found());
        };

        let (route, params) = match matcher::first_match(&self.routes, request.method(), &path) {
            RouteMatch::Found { route, params, .. } => (route, params),
            RouteMatch::NotFound { method_mismatch } => {
                tracing::debug!(
                    request_id = %request.id(),
                    method = %request.method(),
                    path = %path,
                    method_mismatch,
                    "No route matched"
                );
                if method_mismatch && self.method_not_allowed {
                    return Ok(self.method_not_allowed_response(&path));
                }
                return Ok(Response::not_found());
            }
        };

        tracing::debug!(
            request_id = %request.id(),
            method = %request.method(),
            path = %path,
            route = %route.uri(),
            "Route matched"
        );

        let handler = self.resolve_handler(route.handler())?;
        let chain = route
            .middleware()
            .iter()
            .map(|m| self.resolve_middleware(m))
            .collect::<Result<Vec<_>, _>>()?;

        let endpoint = |request: &Request| -> Result<Response, HandlerError> {
            Ok(handler.call(request, &params)?.into_response())
        };
        Next::new(&chain, &params, &endpoint)
            .run(&mut request)
            .map_err(DispatchError::Handler)
    }

    /// Build the URL for a named route: base path + substituted pattern +
    /// trailing slash.
    pub fn url(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        let route = self.named(name).ok_or_else(|| RouterError::RouteNotFound {
            name: name.to_string(),
        })?;

        let path = route.pattern().build(params).map_err(|err| match err {
            BuildError::Missing(parameter) => RouterError::MissingParameter {
                route: name.to_string(),
                parameter,
            },
            BuildError::Rejected { parameter, value } => RouterError::InvalidParameter {
                route: name.to_string(),
                parameter,
                value,
            },
        })?;

        let mut url = join_paths(&self.base_path, &path);
        if !url.ends_with('/') {
            url.push('/');
        }
        Ok(url)
    }

    fn resolve_handler(&self, handler: &Handler) -> Result<Arc<dyn RouteHandler>, DispatchError> {
        match handler {
            Handler::Inline(inline) => Ok(Arc::clone(inline)),
            Handler::Named(name) => self
                .resolver
                .as_ref()
                .and_then(|resolver| resolver.handler(name))
                .ok_or_else(|| DispatchError::UnresolvedHandler(name.clone())),
        }
    }

    fn resolve_middleware(&self, middleware: &MiddlewareRef) -> Result<Arc<dyn Middleware>, DispatchError> {
        match middleware {
            MiddlewareRef::Inline(inline) => Ok(Arc::clone(inline)),
            MiddlewareRef::Named(name) => self
                .resolver
                .as_ref()
                .and_then(|resolver| resolver.middleware(name))
                .ok_or_else(|| DispatchError::UnresolvedMiddleware(name.clone())),
        }
    }

    fn method_not_allowed_response(&self, path: &str) -> Response {
        let allowed = matcher::allowed_methods(&self.routes, path)
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let response = Response::new(StatusCode::METHOD_NOT_ALLOWED);
        match HeaderValue::from_str(&allowed) {
            Ok(value) => response.with_header(ALLOW, value),
            Err(_) => response,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_path", &self.base_path)
            .field("routes", &self.routes.len())
            .field("named", &self.named.len())
            .field("resolver", &self.resolver.is_some())
            .field("method_not_allowed", &self.method_not_allowed)
            .finish()
    }
}

impl RouteRegistrar for Router {
    fn map<I, M, H>(&mut self, methods: I, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
        H: Into<Handler>,
    {
        let methods = parse_methods(uri, methods)?;
        let id = self.register(methods, uri.to_string(), handler.into(), Vec::new())?;
        Ok(RouteHandle::new(self, id))
    }

    fn group<F>(&mut self, prefix: &str, builder: F) -> Result<GroupRecord, RouterError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouterError>,
    {
        let mut group = RouteGroup::new(self, join_paths("/", prefix), Vec::new());
        builder(&mut group)?;
        Ok(group.into_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{handler_fn, middleware_fn, Registry};

    fn get(uri: &str) -> Request {
        Request::create("GET", uri).unwrap()
    }

    #[test]
    fn test_base_path_is_normalized_and_replaced() {
        let mut router = Router::new();
        router.set_base_path("blog");
        assert_eq!(router.base_path(), "/blog/");
        router.set_base_path("/sub/");
        assert_eq!(router.base_path(), "/sub/");
        router.set_base_path("");
        assert_eq!(router.base_path(), "/");
    }

    #[test]
    fn test_local_path_strips_base() {
        let mut router = Router::new();
        router.set_base_path("/sub/");
        assert_eq!(router.local_path("/sub/posts").as_deref(), Some("/posts"));
        assert_eq!(router.local_path("/sub").as_deref(), Some("/"));
        assert_eq!(router.local_path("/other/posts"), None);
    }

    #[test]
    fn test_dispatch_runs_matching_handler() {
        let mut router = Router::new();
        router
            .get("/posts/{id}", handler_fn(|_, params| Ok(format!("post {}", params.get("id").unwrap_or("")))))
            .unwrap();

        let response = router.dispatch(get("/posts/7")).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body_text(), "post 7");
    }

    #[test]
    fn test_no_match_is_empty_404() {
        let router = Router::new();
        let response = router.dispatch(get("/missing")).unwrap();
        assert_eq!(response.status_code(), 404);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_method_not_allowed_mode() {
        let mut router = Router::new();
        router.map(["GET", "HEAD"], "/posts", handler_fn(|_, _| Ok("list"))).unwrap();

        let post = Request::create("POST", "/posts").unwrap();
        assert_eq!(router.dispatch(post).unwrap().status_code(), 404);

        router.set_method_not_allowed(true);
        let post = Request::create("POST", "/posts").unwrap();
        let response = router.dispatch(post).unwrap();
        assert_eq!(response.status_code(), 405);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }

    #[test]
    fn test_named_handler_needs_resolver() {
        let mut router = Router::new();
        router.get("/health", "health").unwrap();

        let err = router.dispatch(get("/health")).unwrap_err();
        assert!(matches!(err, DispatchError::UnresolvedHandler(ref name) if name == "health"));

        let mut registry = Registry::new();
        registry.register_handler("health", |_, _| Ok("ok"));
        router.set_resolver(Arc::new(registry));
        assert_eq!(router.dispatch(get("/health")).unwrap().body_text(), "ok");
    }

    #[test]
    fn test_middleware_can_short_circuit() {
        let mut router = Router::new();
        router
            .get("/admin", handler_fn(|_, _| Ok("secret")))
            .unwrap()
            .middleware(middleware_fn(|_, _| Ok(Response::new(StatusCode::FORBIDDEN))));

        let response = router.dispatch(get("/admin")).unwrap();
        assert_eq!(response.status_code(), 403);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut router = Router::new();
        router
            .get("/boom", handler_fn(|_, _| -> Result<(), HandlerError> { Err("boom".into()) }))
            .unwrap();

        match router.dispatch(get("/boom")) {
            Err(DispatchError::Handler(err)) => assert_eq!(err.to_string(), "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_url_prepends_base_and_appends_slash() {
        let mut router = Router::new();
        router.set_base_path("/sub/");
        router.get("/posts/{id}/", "show").unwrap().name("post.show").unwrap();
        router.get("/archive/{year?}", "archive").unwrap().name("archive").unwrap();

        assert_eq!(
            router.url("post.show", &Params::from([("id", "42")])).unwrap(),
            "/sub/posts/42/"
        );
        assert_eq!(router.url("archive", &Params::new()).unwrap(), "/sub/archive/");
    }

    #[test]
    fn test_url_errors() {
        let mut router = Router::new();
        router.get("/posts/{id:\\d+}", "show").unwrap().name("post.show").unwrap();

        assert!(matches!(
            router.url("nope", &Params::new()),
            Err(RouterError::RouteNotFound { .. })
        ));
        assert!(matches!(
            router.url("post.show", &Params::new()),
            Err(RouterError::MissingParameter { .. })
        ));
        assert!(matches!(
            router.url("post.show", &Params::from([("id", "abc")])),
            Err(RouterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected_and_rename_frees_old_name() {
        let mut router = Router::new();
        let first = router.get("/a", "a").unwrap().name("a").unwrap().id();
        assert!(matches!(
            router.get("/b", "b").unwrap().name("a"),
            Err(RouterError::DuplicateRouteName { .. })
        ));

        let renamed = router.get("/c", "c").unwrap().name("c").unwrap().name("c2").unwrap().id();
        assert!(router.named("c").is_none());
        assert_eq!(router.named("c2").map(Route::uri), Some("/c"));
        assert_eq!(router.route(first).and_then(Route::name), Some("a"));
        assert_eq!(renamed.index(), 2);
    }
}
