//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that handler and middleware names resolve
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate route names and uncompilable patterns
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{GroupConfig, RouteConfig, SiteConfig};
use crate::handlers::{BUILTIN_HANDLERS, BUILTIN_MIDDLEWARE};
use crate::routing::pattern::{join_paths, RoutePattern};
use crate::routing::route::parse_methods;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One semantic problem, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(config.site_url.trim()) {
        errors.push(ValidationError::new("site_url", format!("not a valid URL ({e})")));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    let mut routes = RouteChecker {
        config,
        names: HashSet::new(),
        errors: &mut errors,
    };
    for (i, route) in config.routes.iter().enumerate() {
        routes.check_route(&format!("routes[{i}]"), "/", route);
    }
    for (i, group) in config.groups.iter().enumerate() {
        routes.check_group(&format!("groups[{i}]"), "/", group);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

struct RouteChecker<'a> {
    config: &'a SiteConfig,
    names: HashSet<&'a str>,
    errors: &'a mut Vec<ValidationError>,
}

impl<'a> RouteChecker<'a> {
    fn check_group(&mut self, field: &str, prefix: &str, group: &'a GroupConfig) {
        let prefix = join_paths(prefix, &group.prefix);
        for (i, name) in group.middleware.iter().enumerate() {
            self.check_middleware(&format!("{field}.middleware[{i}]"), name);
        }
        for (i, route) in group.routes.iter().enumerate() {
            self.check_route(&format!("{field}.routes[{i}]"), &prefix, route);
        }
        for (i, child) in group.groups.iter().enumerate() {
            self.check_group(&format!("{field}.groups[{i}]"), &prefix, child);
        }
    }

    fn check_route(&mut self, field: &str, prefix: &str, route: &'a RouteConfig) {
        let uri = join_paths(prefix, &route.uri);

        if let Err(e) = parse_methods(&uri, &route.methods) {
            self.errors.push(ValidationError::new(format!("{field}.methods"), e.to_string()));
        }
        if let Err(e) = RoutePattern::compile(&uri) {
            self.errors.push(ValidationError::new(format!("{field}.uri"), e.to_string()));
        }
        if !self.handler_exists(&route.handler) {
            self.errors.push(ValidationError::new(
                format!("{field}.handler"),
                format!("unknown handler `{}`", route.handler),
            ));
        }
        for (i, name) in route.middleware.iter().enumerate() {
            self.check_middleware(&format!("{field}.middleware[{i}]"), name);
        }
        if let Some(name) = route.name.as_deref() {
            if !self.names.insert(name) {
                self.errors.push(ValidationError::new(
                    format!("{field}.name"),
                    format!("duplicate route name `{name}`"),
                ));
            }
        }
    }

    fn check_middleware(&mut self, field: &str, name: &str) {
        if !BUILTIN_MIDDLEWARE.contains(&name) {
            self.errors
                .push(ValidationError::new(field, format!("unknown middleware `{name}`")));
        }
    }

    fn handler_exists(&self, name: &str) -> bool {
        BUILTIN_HANDLERS.contains(&name) || self.config.pages.contains_key(name)
    }
}
