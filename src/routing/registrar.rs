//! Registration API shared by [`Router`](crate::routing::Router) and
//! [`RouteGroup`](crate::routing::RouteGroup).

use crate::error::RouterError;
use crate::http::Handler;
use crate::routing::group::{GroupRecord, RouteGroup};
use crate::routing::route::RouteHandle;

pub trait RouteRegistrar {
    /// Register one route answering every method in `methods`.
    fn map<I, M, H>(&mut self, methods: I, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
        H: Into<Handler>;

    /// Open a group under `prefix`; `builder` runs immediately.
    fn group<F>(&mut self, prefix: &str, builder: F) -> Result<GroupRecord, RouterError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouterError>;

    fn get<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["GET"], uri, handler)
    }

    fn post<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["POST"], uri, handler)
    }

    fn put<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["PUT"], uri, handler)
    }

    fn patch<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["PATCH"], uri, handler)
    }

    fn delete<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["DELETE"], uri, handler)
    }

    fn options<H: Into<Handler>>(&mut self, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError> {
        self.map(["OPTIONS"], uri, handler)
    }
}
