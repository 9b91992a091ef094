//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for a site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public site URL; the router's base path is derived from its path.
    pub site_url: String,

    /// Answer 405 instead of 404 when only the method differs.
    pub method_not_allowed: bool,

    /// Listener configuration for `serve`.
    pub listener: ListenerConfig,

    pub timeouts: TimeoutConfig,

    pub observability: ObservabilityConfig,

    /// Host fallback behavior for requests no route handles.
    pub host: HostConfig,

    /// Static pages: handler name → body. Each becomes a named handler.
    pub pages: BTreeMap<String, String>,

    /// Top-level routes, registered before groups.
    pub routes: Vec<RouteConfig>,

    pub groups: Vec<GroupConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:8080".to_string(),
            method_not_allowed: false,
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            host: HostConfig::default(),
            pages: BTreeMap::new(),
            routes: Vec::new(),
            groups: Vec::new(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest request body buffered before dispatch.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Body of the host's own page, served when the router defers.
    pub fallback_body: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            fallback_body: "Not Found".to_string(),
        }
    }
}

/// One route declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Name for URL generation.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// URI pattern, relative to the enclosing group.
    pub uri: String,

    /// Named handler resolved at dispatch.
    pub handler: String,

    #[serde(default)]
    pub middleware: Vec<String>,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

/// A prefix + middleware scope around routes and nested groups.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    pub prefix: String,
    pub middleware: Vec<String>,
    pub routes: Vec<RouteConfig>,
    pub groups: Vec<GroupConfig>,
}
