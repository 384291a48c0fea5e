//! HTTP backend: the last step of an endpoint's proxy chain.
//!
//! # Responsibilities
//! - Forward the buffered request to the endpoint's backend
//! - Relay 2xx responses as unparsed streams
//! - Turn other statuses into errors, renderable when the endpoint asks
//!
//! # Design Decisions
//! - Error bodies are buffered (bounded) so they can be rendered later
//! - The timeout covers connect, headers and error body; success bodies stream

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, Request, StatusCode};
use bytes::Bytes;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::config::EndpointConfig;
use crate::proxy::{no_op_response_parser, proxy_fn, Context, Proxy, ProxyError, ProxyRequest, ProxyResult};
use crate::render::RenderableError;

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// A non-2xx backend response, kept whole so it can be shown to the client.
#[derive(Debug, thiserror::Error)]
#[error("backend `{endpoint}` returned {status}")]
pub struct BackendStatusError {
    pub endpoint: String,
    pub status: StatusCode,
    pub content_type: Vec<HeaderValue>,
    pub body: Bytes,
}

#[async_trait]
impl RenderableError for BackendStatusError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn content_type(&self) -> Vec<HeaderValue> {
        self.content_type.clone()
    }

    async fn body(&self) -> io::Result<Option<Bytes>> {
        Ok(Some(self.body.clone()))
    }
}

/// Forwards requests for one endpoint to its backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector, Body>,
    endpoint: Arc<EndpointConfig>,
}

impl HttpBackend {
    pub fn new(client: Client<HttpConnector, Body>, endpoint: &EndpointConfig) -> Self {
        Self {
            client,
            endpoint: Arc::new(endpoint.clone()),
        }
    }

    /// This backend as the innermost step of a proxy chain.
    pub fn into_proxy(self) -> Proxy {
        let backend = Arc::new(self);
        proxy_fn(move |ctx, request| {
            let backend = Arc::clone(&backend);
            async move { backend.forward(ctx, request).await }
        })
    }

    async fn forward(&self, ctx: Context, request: ProxyRequest) -> ProxyResult {
        let timeout = Duration::from_secs(self.endpoint.timeout_secs);
        let call = tokio::time::timeout(timeout, self.call(&ctx, request));

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(ProxyError::Canceled.into()),
            outcome = call => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        endpoint = %self.endpoint.name,
                        timeout = ?timeout,
                        "Backend timed out"
                    );
                    Err(ProxyError::Timeout(timeout).into())
                }
            },
        }
    }

    async fn call(&self, ctx: &Context, request: ProxyRequest) -> ProxyResult {
        let path = self
            .endpoint
            .backend_path
            .as_deref()
            .unwrap_or_else(|| request.path_and_query())
            .to_string();
        let uri = format!("http://{}{}", self.endpoint.backend, path);

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers.iter() {
                if !HOP_BY_HOP.contains(name) && name != header::CONTENT_LENGTH {
                    headers.append(name.clone(), value.clone());
                }
            }
            if let Ok(id) = HeaderValue::from_str(ctx.request_id()) {
                headers.insert("x-request-id", id);
            }
        }
        let outbound = builder
            .body(Body::from(request.body))
            .map_err(ProxyError::from)?;

        tracing::debug!(
            request_id = %ctx.request_id(),
            endpoint = %self.endpoint.name,
            backend = %self.endpoint.backend,
            path = %path,
            "Forwarding to backend"
        );

        let response = self.client.request(outbound).await.map_err(|e| {
            tracing::error!(
                request_id = %ctx.request_id(),
                backend = %self.endpoint.backend,
                error = %e,
                "Upstream error"
            );
            ProxyError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return no_op_response_parser(ctx, response.map(|body| Some(Body::new(body))));
        }

        if !self.endpoint.render_backend_errors {
            return Err(ProxyError::InvalidStatus(status).into());
        }

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.endpoint.max_error_body_bytes)
            .await
            .map_err(ProxyError::Body)?;

        Err(ProxyError::renderable(BackendStatusError {
            endpoint: self.endpoint.name.clone(),
            status,
            content_type: parts.headers.get_all(header::CONTENT_TYPE).iter().cloned().collect(),
            body,
        })
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backend_status_error_renders_itself() {
        let err = BackendStatusError {
            endpoint: "users".into(),
            status: StatusCode::NOT_FOUND,
            content_type: vec![HeaderValue::from_static("application/json")],
            body: Bytes::from_static(b"{}"),
        };

        assert_eq!(err.to_string(), "backend `users` returned 404 Not Found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.content_type(), [HeaderValue::from_static("application/json")]);
        assert_eq!(err.body().await.unwrap().unwrap(), Bytes::from_static(b"{}"));
    }

    #[test]
    fn opaque_statuses_map_to_server_error() {
        let err = ProxyError::InvalidStatus(StatusCode::NOT_FOUND);
        assert!(err.as_renderable().is_none());
        assert_eq!(err.default_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ProxyError::Timeout(Duration::from_secs(1)).default_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
