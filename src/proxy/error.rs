//! Failures produced by proxy steps.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use crate::proxy::ProxyResponse;
use crate::render::RenderableError;

/// Why a proxy step failed.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The failure describes its own HTTP response.
    #[error("{0}")]
    Renderable(Box<dyn RenderableError>),

    #[error("backend returned status {0}")]
    InvalidStatus(StatusCode),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read body: {0}")]
    Body(#[source] axum::Error),

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("request canceled")]
    Canceled,

    #[error("invalid backend request: {0}")]
    Request(#[from] axum::http::Error),
}

impl ProxyError {
    /// Wrap an error that knows how to render itself.
    pub fn renderable(err: impl RenderableError) -> Self {
        Self::Renderable(Box::new(err))
    }

    /// Capability check: the renderable view of this error, if it has one.
    pub fn as_renderable(&self) -> Option<&dyn RenderableError> {
        match self {
            Self::Renderable(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Status the host answers with when nothing rendered this error.
    pub fn default_status(&self) -> StatusCode {
        match self {
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) | Self::Body(_) => StatusCode::BAD_GATEWAY,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed step: the error plus whatever response the step had built.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ProxyFailure {
    pub response: Option<ProxyResponse>,
    #[source]
    pub error: ProxyError,
}

impl ProxyFailure {
    pub fn new(response: Option<ProxyResponse>, error: ProxyError) -> Self {
        Self { response, error }
    }
}

impl From<ProxyError> for ProxyFailure {
    fn from(error: ProxyError) -> Self {
        Self {
            response: None,
            error,
        }
    }
}
