//! HTTP types and host front-end.
//!
//! # Data Flow
//! ```text
//! TCP connection (serve) / CGI environment (cgi)
//!     → request.rs (buffer body, assign request ID)
//!     → routing::Router::dispatch
//!         → middleware.rs (Next chain, may short-circuit)
//!         → handler.rs (inline or resolver.rs named handler)
//!     → response.rs (coerced output, wire serialization)
//! ```

pub mod handler;
pub mod middleware;
pub mod request;
pub mod resolver;
pub mod response;
pub mod server;

pub use handler::{handler_fn, Handler, HandlerOutput, RouteHandler};
pub use middleware::{middleware_fn, Middleware, MiddlewareRef, Next};
pub use request::{Request, X_REQUEST_ID};
pub use resolver::{Registry, Resolver};
pub use response::Response;
pub use server::HttpServer;
