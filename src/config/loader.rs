//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ControlPlaneConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ControlPlaneConfig, ConfigError> {
    let config: ControlPlaneConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ControlPlaneConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:9876"

[admin]
api_key = "secret"

[executor]
queue_depth = 16
provisioning_delay_ms = 0

[[topology.load_balancers]]
id = "5b6f7e2c-6a8e-4f5f-9c1d-3f2b1a0e9d11"
name = "web"

[[topology.load_balancers.pools]]
id = "0f3c2a1b-7d4e-4c5b-8a9f-1e2d3c4b5a60"
name = "web-pool"

[[topology.load_balancers.listeners]]
id = "9a8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d"
name = "http"
protocol_port = 80
default_pool = "0f3c2a1b-7d4e-4c5b-8a9f-1e2d3c4b5a60"
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9876");
        assert_eq!(config.admin.api_key, "secret");
        assert_eq!(config.executor.queue_depth, 16);
        assert_eq!(config.timeouts.request_secs, 30);

        let lb = &config.topology.load_balancers[0];
        assert_eq!(lb.pools.len(), 1);
        assert_eq!(lb.listeners[0].default_pool, Some(lb.pools[0].id));
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("[admin]\napi_key = \"\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: admin.api_key must not be empty"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("lb-control-plane-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, SAMPLE).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.topology.load_balancers.len(), 1);
        std::fs::remove_file(&path).unwrap_or_default();

        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
