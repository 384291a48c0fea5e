//! Endpoint handlers and the factories that build them.
//!
//! # Responsibilities
//! - Build the request context (request ID, cancellation, live exchange)
//! - Buffer the inbound request and run the endpoint's proxy chain
//! - Turn the chain's outcome into the client response
//!
//! # Design Decisions
//! - A failed chain whose exchange was committed is answered with what was
//!   written; the error is still logged and counted
//! - Otherwise the error's default status is sent with an empty body
//! - Dropping the handler future (client gone, request timeout) cancels the
//!   context

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::config::EndpointConfig;
use crate::http::exchange::{Exchange, ResponseWriter};
use crate::observability::metrics;
use crate::proxy::{Context, Proxy, ProxyError, ProxyRequest};

/// Serves every request for one endpoint.
pub type Handler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

/// Builds the handler for an endpoint from its configuration and proxy chain.
///
/// Decorators take a factory and return a factory of this same shape, so they
/// slot into the chain without the host noticing.
pub trait HandlerFactory: Send + Sync {
    fn new_handler(&self, endpoint: &EndpointConfig, proxy: Proxy) -> Handler;
}

impl<F: HandlerFactory + ?Sized> HandlerFactory for Box<F> {
    fn new_handler(&self, endpoint: &EndpointConfig, proxy: Proxy) -> Handler {
        (**self).new_handler(endpoint, proxy)
    }
}

impl<F: HandlerFactory + ?Sized> HandlerFactory for Arc<F> {
    fn new_handler(&self, endpoint: &EndpointConfig, proxy: Proxy) -> Handler {
        (**self).new_handler(endpoint, proxy)
    }
}

/// The gateway's own endpoint handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointHandlerFactory;

impl HandlerFactory for EndpointHandlerFactory {
    fn new_handler(&self, endpoint: &EndpointConfig, proxy: Proxy) -> Handler {
        let endpoint = Arc::new(endpoint.clone());
        Arc::new(move |request: Request<Body>| -> BoxFuture<'static, Response> {
            let endpoint = Arc::clone(&endpoint);
            let proxy = Arc::clone(&proxy);
            Box::pin(async move { serve(&endpoint, &proxy, request).await })
        })
    }
}

async fn serve(endpoint: &EndpointConfig, proxy: &Proxy, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let exchange = Exchange::new(ResponseWriter::new(endpoint.max_response_bytes, cancel.clone()));
    let ctx = Context::new(request_id.clone(), cancel).with_exchange(exchange.clone());

    tracing::debug!(
        request_id = %request_id,
        endpoint = %endpoint.name,
        method = %request.method(),
        path = %request.uri().path(),
        "Proxying request"
    );

    let request = match ProxyRequest::from_http(request, endpoint.max_body_bytes).await {
        Ok(request) => request,
        Err(e) => {
            let status = match e {
                ProxyError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
            metrics::record_request(&endpoint.name, status.as_u16(), start);
            return status.into_response();
        }
    };

    let response = match proxy(ctx, request).await {
        Ok(response) => response.into_response(),
        Err(failure) => {
            tracing::warn!(
                request_id = %request_id,
                endpoint = %endpoint.name,
                error = %failure.error,
                "Proxy chain failed"
            );
            match exchange.take_response().await {
                Some(written) => written,
                None => failure.error.default_status().into_response(),
            }
        }
    };

    metrics::record_request(&endpoint.name, response.status().as_u16(), start);
    response
}
