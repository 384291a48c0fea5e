//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Detect conflicting endpoints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoint #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("endpoint `{0}` is defined more than once")]
    DuplicateName(String),

    #[error("endpoint `{name}` path `{path}` must start with '/'")]
    InvalidPath { name: String, path: String },

    #[error("path `{0}` is served by more than one endpoint")]
    DuplicatePath(String),

    #[error("endpoint `{0}` has no backend address")]
    MissingBackend(String),

    #[error("endpoint `{0}`: {1} must be greater than zero")]
    Zero(String, &'static str),

    #[error("endpoint `{0}`: max_response_bytes is smaller than max_error_body_bytes")]
    ResponseLimitBelowErrorBody(String),

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    let mut paths = HashSet::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for (index, endpoint) in config.endpoints.iter().enumerate() {
        if endpoint.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(endpoint.name.as_str()) {
            errors.push(ValidationError::DuplicateName(endpoint.name.clone()));
        }

        if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                name: endpoint.name.clone(),
                path: endpoint.path.clone(),
            });
        } else if !paths.insert(endpoint.path.as_str()) {
            errors.push(ValidationError::DuplicatePath(endpoint.path.clone()));
        }

        if endpoint.backend.trim().is_empty() {
            errors.push(ValidationError::MissingBackend(endpoint.name.clone()));
        }

        let limits = [
            ("timeout_secs", endpoint.timeout_secs as usize),
            ("max_body_bytes", endpoint.max_body_bytes),
            ("max_error_body_bytes", endpoint.max_error_body_bytes),
            ("max_response_bytes", endpoint.max_response_bytes),
        ];
        for (field, value) in limits {
            if value == 0 {
                errors.push(ValidationError::Zero(endpoint.name.clone(), field));
            }
        }

        if endpoint.max_response_bytes < endpoint.max_error_body_bytes {
            errors.push(ValidationError::ResponseLimitBelowErrorBody(endpoint.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.endpoints.push(EndpointConfig::new("users", "/users", "127.0.0.1:3000"));
        config.endpoints.push(EndpointConfig::new("users", "/users", ""));
        let mut bad = EndpointConfig::new("", "orders", "127.0.0.1:3001");
        bad.timeout_secs = 0;
        config.endpoints.push(bad);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateName("users".into())));
        assert!(errors.contains(&ValidationError::DuplicatePath("/users".into())));
        assert!(errors.contains(&ValidationError::MissingBackend("users".into())));
        assert!(errors.contains(&ValidationError::EmptyName { index: 2 }));
        assert!(errors.contains(&ValidationError::InvalidPath {
            name: String::new(),
            path: "orders".into(),
        }));
        assert!(errors.contains(&ValidationError::Zero(String::new(), "timeout_secs")));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn response_limit_must_hold_error_body() {
        let mut config = GatewayConfig::default();
        let mut endpoint = EndpointConfig::new("tea", "/tea", "127.0.0.1:3000");
        endpoint.max_error_body_bytes = 1024;
        endpoint.max_response_bytes = 512;
        config.endpoints.push(endpoint);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, [ValidationError::ResponseLimitBelowErrorBody("tea".into())]);
    }

    #[test]
    fn small_request_limit_is_independent_of_error_body() {
        let mut config = GatewayConfig::default();
        let mut endpoint = EndpointConfig::new("tea", "/tea", "127.0.0.1:3000");
        endpoint.max_body_bytes = 4;
        config.endpoints.push(endpoint);

        assert!(validate_config(&config).is_ok());
    }
}
