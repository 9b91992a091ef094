//! Site router library.
//!
//! A first-match HTTP router with named routes, groups and middleware,
//! embedded in a host site through lifecycle hooks and router filters.

pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::SiteConfig;
pub use host::{SiteHost, SiteRouter};
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// The types needed to declare and serve routes.
pub mod prelude {
    pub use crate::error::{DispatchError, HandlerError, RouterError};
    pub use crate::host::{CaptureEmitter, Emitter, FilterHook, Host, Outcome, SiteHost, SiteRouter};
    pub use crate::http::{handler_fn, middleware_fn, Handler, HandlerOutput, Next, Registry, Request, Response};
    pub use crate::lifecycle::{EndRequest, Terminate};
    pub use crate::routing::{Params, RouteRegistrar, Router};
}
