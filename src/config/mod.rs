//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → apply.rs (register routes on a fresh Router)
//!
//! On change (serve --watch):
//!     watcher.rs detects change
//!     → loader.rs loads + validates
//!     → new Router built from scratch
//!     → atomic swap in the HTTP host
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod apply;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use apply::apply_config;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{GroupConfig, HostConfig, ListenerConfig, RouteConfig, SiteConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
