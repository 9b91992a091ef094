//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     map/get/post/... or group(prefix, builder)
//!     → route.rs (parse methods, compose group prefix + middleware)
//!     → pattern.rs (compile `{param}` pattern)
//!     → router.rs (append to table, index name)
//!
//! Dispatch:
//!     Request
//!     → router.rs (strip base path)
//!     → matcher.rs (first route whose methods and pattern match)
//!     → middleware chain → handler → Response (404 on no match)
//! ```
//!
//! # Design Decisions
//! - First match wins, in registration order
//! - Groups are flattened at registration; nothing is re-walked at dispatch
//! - Regex only for constrained parameters

pub mod group;
pub mod matcher;
pub mod pattern;
pub mod registrar;
pub mod route;
pub mod router;

pub use group::{GroupRecord, RouteGroup};
pub use matcher::RouteMatch;
pub use pattern::{Params, RoutePattern, Segment, TrailingSlash};
pub use registrar::RouteRegistrar;
pub use route::{Route, RouteHandle, RouteId};
pub use router::Router;
