//! Route table scan.
//!
//! # Design Decisions
//! - First match wins, in registration order (no specificity ranking)
//! - A path match under another method is remembered so callers can tell
//!   "not found" from "method not allowed"

use axum::http::Method;

use crate::routing::pattern::Params;
use crate::routing::route::{Route, RouteId};

/// Outcome of looking a request up in the route table.
#[derive(Debug)]
pub enum RouteMatch<'r> {
    Found {
        id: RouteId,
        route: &'r Route,
        params: Params,
    },
    NotFound {
        /// Some route matched the path but not the method.
        method_mismatch: bool,
    },
}

impl RouteMatch<'_> {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteMatch::Found { .. })
    }
}

pub(crate) fn first_match<'r>(routes: &'r [Route], method: &Method, path: &str) -> RouteMatch<'r> {
    let mut method_mismatch = false;

    for (index, route) in routes.iter().enumerate() {
        if !route.allows(method) {
            method_mismatch = method_mismatch || route.pattern.matches(path).is_some();
            continue;
        }
        if let Some(params) = route.pattern.matches(path) {
            return RouteMatch::Found {
                id: RouteId(index),
                route,
                params,
            };
        }
    }

    RouteMatch::NotFound { method_mismatch }
}

/// Every method some route accepts for `path`, in first-seen order.
pub(crate) fn allowed_methods(routes: &[Route], path: &str) -> Vec<Method> {
    let mut allowed: Vec<Method> = Vec::new();
    for route in routes.iter().filter(|r| r.pattern.matches(path).is_some()) {
        for method in route.methods() {
            if !allowed.contains(method) {
                allowed.push(method.clone());
            }
        }
    }
    allowed
}
