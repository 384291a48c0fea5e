//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::interceptor::RenderStrategy;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Endpoint definitions, each proxied to a single backend.
    pub endpoints: Vec<EndpointConfig>,

    /// Error rendering interceptor settings.
    pub error_rendering: ErrorRenderingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A single proxied endpoint.
///
/// The error rendering layer never reads this; it is handed through to the
/// wrapped handler factory unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Endpoint identifier for logging/metrics.
    pub name: String,

    /// Route pattern exposed by the gateway (axum syntax, e.g. "/users/{id}").
    pub path: String,

    /// Backend address (e.g., "127.0.0.1:3000").
    pub backend: String,

    /// Path sent to the backend. Defaults to the incoming path.
    #[serde(default)]
    pub backend_path: Option<String>,

    /// Backend call timeout in seconds.
    #[serde(default = "default_endpoint_timeout")]
    pub timeout_secs: u64,

    /// Maximum request body size buffered before forwarding.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Maximum backend error body kept for rendering.
    #[serde(default = "default_max_error_body_bytes")]
    pub max_error_body_bytes: usize,

    /// Maximum body written onto the live exchange. Must hold any error body.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,

    /// Turn non-2xx backend responses into renderable errors.
    #[serde(default = "default_render_backend_errors")]
    pub render_backend_errors: bool,
}

impl EndpointConfig {
    /// Build an endpoint with default limits.
    pub fn new(name: impl Into<String>, path: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            backend: backend.into(),
            backend_path: None,
            timeout_secs: default_endpoint_timeout(),
            max_body_bytes: default_max_body_bytes(),
            max_error_body_bytes: default_max_error_body_bytes(),
            max_response_bytes: default_max_response_bytes(),
            render_backend_errors: default_render_backend_errors(),
        }
    }
}

fn default_endpoint_timeout() -> u64 {
    10
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024 // 2MB
}

fn default_max_error_body_bytes() -> usize {
    64 * 1024
}

fn default_max_response_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_render_backend_errors() -> bool {
    true
}

/// Error rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorRenderingConfig {
    /// Wrap endpoint handlers with the error rendering interceptor.
    pub enabled: bool,

    /// How renderable errors reach the client.
    pub strategy: RenderStrategy,
}

impl Default for ErrorRenderingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: RenderStrategy::default(),
        }
    }
}

/// Timeout configuration.
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
