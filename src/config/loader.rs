//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::RouterError;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Routes(RouterError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Routes(e) => write!(f, "Route registration failed: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Routes(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

impl From<RouterError> for ConfigError {
    fn from(e: RouterError) -> Self {
        ConfigError::Routes(e)
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            site_url = "https://example.com/blog"
            method_not_allowed = true

            [listener]
            bind_address = "127.0.0.1:9000"

            [pages]
            about = "About us"

            [[routes]]
            name = "about"
            uri = "/about/"
            handler = "about"

            [[groups]]
            prefix = "api"
            middleware = ["no_store"]

            [[groups.routes]]
            methods = ["get", "post"]
            uri = "echo"
            handler = "echo"
            "#,
        )
        .unwrap();

        assert_eq!(config.site_url, "https://example.com/blog");
        assert!(config.method_not_allowed);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.routes[0].methods, vec!["GET"]);
        assert_eq!(config.groups[0].routes[0].methods, vec!["get", "post"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.site_url, "http://localhost:8080");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        assert!(matches!(parse_config("routes = ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_semantic_errors_are_reported() {
        let err = parse_config(
            r#"
            [[routes]]
            uri = "/x"
            handler = "nobody"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("routes[0].handler"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
