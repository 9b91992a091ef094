//! Route groups: shared prefix and middleware, composed at registration.

use crate::error::RouterError;
use crate::http::{Handler, MiddlewareRef};
use crate::routing::pattern::join_paths;
use crate::routing::registrar::RouteRegistrar;
use crate::routing::route::{parse_methods, RouteHandle, RouteId};
use crate::routing::Router;

/// What a group registered, returned once its builder finishes.
#[derive(Debug, Clone, Default)]
pub struct GroupRecord {
    /// Fully composed prefix, always starting with `/`.
    pub prefix: String,
    /// Composed middleware, parent-first.
    pub middleware: Vec<MiddlewareRef>,
    pub routes: Vec<RouteId>,
    pub groups: Vec<GroupRecord>,
}

/// A group being built. Routes registered through it land in the owning
/// router with the group's prefix and middleware applied.
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    record: GroupRecord,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, middleware: Vec<MiddlewareRef>) -> Self {
        Self {
            router,
            record: GroupRecord {
                prefix,
                middleware,
                ..GroupRecord::default()
            },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.record.prefix
    }

    /// Add group middleware. Applies to routes registered after this call.
    pub fn middleware(&mut self, middleware: impl Into<MiddlewareRef>) -> &mut Self {
        self.record.middleware.push(middleware.into());
        self
    }

    pub(crate) fn into_record(self) -> GroupRecord {
        self.record
    }
}

impl RouteRegistrar for RouteGroup<'_> {
    fn map<I, M, H>(&mut self, methods: I, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
        H: Into<Handler>,
    {
        let uri = join_paths(&self.record.prefix, uri);
        let methods = parse_methods(&uri, methods)?;
        let id = self
            .router
            .register(methods, uri, handler.into(), self.record.middleware.clone())?;
        self.record.routes.push(id);
        Ok(RouteHandle::new(&mut *self.router, id))
    }

    fn group<F>(&mut self, prefix: &str, builder: F) -> Result<GroupRecord, RouterError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouterError>,
    {
        let prefix = join_paths(&self.record.prefix, prefix);
        let mut child = RouteGroup::new(&mut *self.router, prefix, self.record.middleware.clone());
        builder(&mut child)?;
        let record = child.into_record();
        self.record.groups.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler_fn;

    #[test]
    fn test_group_prefix_composes() {
        let mut router = Router::new();
        let record = router
            .group("api", |api| {
                api.get("widgets", handler_fn(|_, _| Ok("list")))?;
                api.group("/v2/", |v2| {
                    v2.get("/widgets/{id}", handler_fn(|_, _| Ok("show")))?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        assert_eq!(record.prefix, "/api");
        assert_eq!(record.groups[0].prefix, "/api/v2");
        let uris: Vec<_> = router.routes().iter().map(|r| r.uri()).collect();
        assert_eq!(uris, vec!["/api/widgets", "/api/v2/widgets/{id}"]);
    }

    #[test]
    fn test_group_root_route_dispatches_at_its_url() {
        let mut router = Router::new();
        router
            .group("api", |api| {
                api.get("/", handler_fn(|_, _| Ok("root")))?.name("api.root")?;
                Ok(())
            })
            .unwrap();

        assert_eq!(router.routes()[0].uri(), "/api/");
        let url = router.url("api.root", &crate::routing::Params::new()).unwrap();
        assert_eq!(url, "/api/");

        let response = router.dispatch(crate::http::Request::create("GET", &url).unwrap()).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body_text(), "root");
    }

    #[test]
    fn test_group_middleware_is_parent_first() {
        let mut router = Router::new();
        router
            .group("outer", |outer| {
                outer.middleware("auth");
                outer.group("inner", |inner| {
                    inner.middleware("audit");
                    inner.get("x", "handler")?.middleware("route-only");
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        let names: Vec<_> = router.routes()[0]
            .middleware()
            .iter()
            .map(|m| match m {
                MiddlewareRef::Named(name) => name.as_str(),
                MiddlewareRef::Inline(_) => "inline",
            })
            .collect();
        assert_eq!(names, vec!["auth", "audit", "route-only"]);
    }

    #[test]
    fn test_group_middleware_only_affects_later_routes() {
        let mut router = Router::new();
        router
            .group("g", |g| {
                g.get("before", "h")?;
                g.middleware("late");
                g.get("after", "h")?;
                Ok(())
            })
            .unwrap();
        assert!(router.routes()[0].middleware().is_empty());
        assert_eq!(router.routes()[1].middleware().len(), 1);
    }
}
