//! Registers configured routes and groups on a router.

use std::sync::Arc;

use crate::config::schema::{GroupConfig, RouteConfig, SiteConfig};
use crate::error::RouterError;
use crate::handlers::builtin_registry;
use crate::routing::{RouteRegistrar, Router};

/// Install the built-in resolver and register every configured route.
/// Top-level routes come first, then groups, each in file order.
pub fn apply_config(router: &mut Router, config: &SiteConfig) -> Result<(), RouterError> {
    router.set_resolver(Arc::new(builtin_registry(&config.pages)));
    router.set_method_not_allowed(config.method_not_allowed);

    for route in &config.routes {
        register_route(router, route)?;
    }
    for group in &config.groups {
        register_group(router, group)?;
    }

    tracing::debug!(routes = router.routes().len(), "Configured routes registered");
    Ok(())
}

fn register_route<R: RouteRegistrar>(registrar: &mut R, route: &RouteConfig) -> Result<(), RouterError> {
    let mut handle = registrar.map(&route.methods, &route.uri, route.handler.as_str())?;
    for middleware in &route.middleware {
        handle = handle.middleware(middleware.as_str());
    }
    if let Some(name) = &route.name {
        handle.name(name.as_str())?;
    }
    Ok(())
}

fn register_group<R: RouteRegistrar>(registrar: &mut R, group: &GroupConfig) -> Result<(), RouterError> {
    registrar.group(&group.prefix, |scope| {
        for middleware in &group.middleware {
            scope.middleware(middleware.as_str());
        }
        for route in &group.routes {
            register_route(scope, route)?;
        }
        for child in &group.groups {
            register_group(scope, child)?;
        }
        Ok(())
    })?;
    Ok(())
}
