//! Host integration shell.
//!
//! # Data Flow
//! ```text
//! SiteRouter::init(host, terminate):
//!     Router::new → filter "router.created"
//!     → base path from host.site_url()
//!     → filter "router.configured"
//!     → add_action("loaded", ProcessRequest)
//!
//! Host fires "loaded" for a request:
//!     SiteRouter::process_request
//!     → 404: Deferred, host renders its own page
//!     → otherwise: emit response once, terminate once
//! ```
//!
//! # Design Decisions
//! - The router is an owned value handed to the host, not a global
//! - Emitting and terminating are capabilities supplied by the caller

pub mod base_path;
pub mod cgi;
pub mod filters;
pub mod site;

use std::fmt;
use std::io::{self, Write};

use axum::http::StatusCode;

use crate::error::ProcessError;
use crate::http::{Request, Response};
use crate::routing::Router;

pub use base_path::infer_base_path;
pub use filters::RouterFilters;
pub use site::SiteRouter;

/// Lifecycle event after which the site is ready to answer requests.
pub const LOADED_EVENT: &str = "loaded";

/// Named points at which the host may replace or adjust the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterHook {
    /// Fired right after the router is constructed.
    RouterCreated,
    /// Fired after the base path has been configured.
    RouterConfigured,
}

impl FilterHook {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterHook::RouterCreated => "router.created",
            FilterHook::RouterConfigured => "router.configured",
        }
    }
}

impl fmt::Display for FilterHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work the router asks the host to run on a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    ProcessRequest,
}

/// Capabilities the embedding host provides to the router.
pub trait Host {
    fn site_url(&self) -> String;

    fn add_action(&mut self, event: &str, action: HookAction);

    /// Pass-through unless the host has transforms registered for `hook`.
    fn apply_filters(&mut self, hook: FilterHook, router: Router) -> Router {
        let _ = hook;
        router
    }
}

/// Sends a routed response to the client.
pub trait Emitter {
    fn emit(&mut self, response: &Response) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `HTTP/1.1 <status>` status line.
    Http,
    /// `Status: <status>` header, for CGI gateways.
    Cgi,
}

/// Writes responses to a byte sink.
#[derive(Debug)]
pub struct WireEmitter<W: Write> {
    out: W,
    format: WireFormat,
}

impl<W: Write> WireEmitter<W> {
    pub fn http(out: W) -> Self {
        Self {
            out,
            format: WireFormat::Http,
        }
    }

    pub fn cgi(out: W) -> Self {
        Self {
            out,
            format: WireFormat::Cgi,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for WireEmitter<W> {
    fn emit(&mut self, response: &Response) -> io::Result<()> {
        match self.format {
            WireFormat::Http => response.send(&mut self.out),
            WireFormat::Cgi => response.send_cgi(&mut self.out),
        }
    }
}

/// Holds the emitted response for hosts that build their own reply.
#[derive(Debug, Default)]
pub struct CaptureEmitter {
    response: Option<Response>,
}

impl CaptureEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn take(&mut self) -> Option<Response> {
        self.response.take()
    }
}

impl Emitter for CaptureEmitter {
    fn emit(&mut self, response: &Response) -> io::Result<()> {
        self.response = Some(response.clone());
        Ok(())
    }
}

/// What happened to a request offered to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A route answered; the response was emitted and the request ended.
    Handled { status: StatusCode },
    /// No route answered; the host continues with its own handling.
    Deferred,
}

/// The host used by the `site-router` binary: fixed site URL, registered
/// filters, recorded actions, and a fallback page.
#[derive(Debug)]
pub struct SiteHost {
    site_url: String,
    filters: RouterFilters,
    actions: Vec<(String, HookAction)>,
    fallback_body: String,
}

impl SiteHost {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            filters: RouterFilters::new(),
            actions: Vec::new(),
            fallback_body: "Not Found".to_string(),
        }
    }

    pub fn with_fallback_body(mut self, body: impl Into<String>) -> Self {
        self.fallback_body = body.into();
        self
    }

    pub fn filters_mut(&mut self) -> &mut RouterFilters {
        &mut self.filters
    }

    /// Actions registered for `event`, in registration order.
    pub fn actions(&self, event: &str) -> Vec<HookAction> {
        self.actions
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, action)| *action)
            .collect()
    }

    /// Fire the `loaded` event for one request.
    pub fn fire_loaded(
        &self,
        site: &SiteRouter,
        request: Request,
        emitter: &mut dyn Emitter,
    ) -> Result<Outcome, ProcessError> {
        if self.actions(LOADED_EVENT).contains(&HookAction::ProcessRequest) {
            site.process_request(request, emitter)
        } else {
            Ok(Outcome::Deferred)
        }
    }

    /// The host's own page for requests the router deferred.
    pub fn fallback_response(&self) -> Response {
        Response::text(self.fallback_body.clone()).with_status(StatusCode::NOT_FOUND)
    }
}

impl Host for SiteHost {
    fn site_url(&self) -> String {
        self.site_url.clone()
    }

    fn add_action(&mut self, event: &str, action: HookAction) {
        tracing::debug!(event, ?action, "Action registered");
        self.actions.push((event.to_string(), action));
    }

    fn apply_filters(&mut self, hook: FilterHook, router: Router) -> Router {
        tracing::debug!(hook = %hook, filters = self.filters.len(hook), "Applying router filters");
        self.filters.apply(hook, router)
    }
}
