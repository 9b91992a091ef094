//! The router as seen by a host: built once, offered every request.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;

use crate::error::{DispatchError, ProcessError, RouterError};
use crate::host::{infer_base_path, Emitter, FilterHook, HookAction, Host, Outcome, LOADED_EVENT};
use crate::http::{Handler, Request, Response};
use crate::lifecycle::Terminate;
use crate::routing::{GroupRecord, Params, RouteGroup, RouteHandle, RouteRegistrar, Router};

pub struct SiteRouter {
    router: Router,
    terminate: Arc<dyn Terminate>,
}

impl SiteRouter {
    /// Build the router for `host`, let the host's filters adjust it, and
    /// register request processing on the `loaded` event.
    pub fn init<H>(host: &mut H, terminate: Arc<dyn Terminate>) -> Self
    where
        H: Host + ?Sized,
    {
        let mut router = host.apply_filters(FilterHook::RouterCreated, Router::new());

        let site_url = host.site_url();
        router.set_base_path(&infer_base_path(&site_url));
        tracing::info!(site_url = %site_url, base_path = %router.base_path(), "Router configured");

        let router = host.apply_filters(FilterHook::RouterConfigured, router);
        host.add_action(LOADED_EVENT, HookAction::ProcessRequest);

        Self { router, terminate }
    }

    /// Offer one request to the router.
    ///
    /// A 404 from the router leaves the request to the host: nothing is
    /// emitted and the request is not terminated.
    pub fn process_request(&self, request: Request, emitter: &mut dyn Emitter) -> Result<Outcome, ProcessError> {
        let request_id = request.id().to_string();
        let response = self.router.dispatch(request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(request_id = %request_id, "Deferring to host");
            return Ok(Outcome::Deferred);
        }

        emitter.emit(&response).map_err(ProcessError::Emit)?;
        tracing::debug!(request_id = %request_id, status = status.as_u16(), "Response sent");
        self.terminate.terminate();
        Ok(Outcome::Handled { status })
    }

    pub fn dispatch(&self, request: Request) -> Result<Response, DispatchError> {
        self.router.dispatch(request)
    }

    pub fn url(&self, name: &str, params: &Params) -> Result<String, RouterError> {
        self.router.url(name, params)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }
}

impl RouteRegistrar for SiteRouter {
    fn map<I, M, H>(&mut self, methods: I, uri: &str, handler: H) -> Result<RouteHandle<'_>, RouterError>
    where
        I: IntoIterator<Item = M>,
        M: AsRef<str>,
        H: Into<Handler>,
    {
        self.router.map(methods, uri, handler)
    }

    fn group<F>(&mut self, prefix: &str, builder: F) -> Result<GroupRecord, RouterError>
    where
        F: FnOnce(&mut RouteGroup<'_>) -> Result<(), RouterError>,
    {
        self.router.group(prefix, builder)
    }
}

impl fmt::Debug for SiteRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteRouter").field("router", &self.router).finish_non_exhaustive()
    }
}
