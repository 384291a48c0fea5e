//! Responses flowing back up the proxy chain.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use serde_json::{Map, Value};

use crate::proxy::{Context, ProxyResult};

/// Status and headers of the response a backend (or a renderer) produced.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub status_code: StatusCode,
    pub headers: HeaderMap,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            status_code: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

/// Result of a proxy step.
///
/// Either `io` carries a body stream to relay as-is, or `data` carries a
/// decoded document for the host to encode.
#[derive(Debug, Default)]
pub struct ProxyResponse {
    pub data: Map<String, Value>,
    pub is_complete: bool,
    pub metadata: Metadata,
    pub io: Option<Body>,
}

/// Surface an already built response as the step's result.
///
/// Nothing is decoded: status and headers become metadata and the body stream
/// is relayed untouched.
pub fn no_op_response_parser(ctx: &Context, response: Response<Option<Body>>) -> ProxyResult {
    let (parts, body) = response.into_parts();
    tracing::trace!(
        request_id = %ctx.request_id(),
        status = %parts.status,
        has_body = body.is_some(),
        "Passing response through unparsed"
    );

    Ok(ProxyResponse {
        data: Map::new(),
        is_complete: true,
        metadata: Metadata {
            status_code: parts.status,
            headers: parts.headers,
        },
        io: body,
    })
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> axum::response::Response {
        let mut headers = self.metadata.headers;
        let body = match self.io {
            Some(io) => io,
            None if self.data.is_empty() => Body::empty(),
            None => match serde_json::to_vec(&self.data) {
                Ok(encoded) => {
                    headers
                        .entry(header::CONTENT_TYPE)
                        .or_insert(HeaderValue::from_static("application/json"));
                    Body::from(encoded)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode response data");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.metadata.status_code;
        *response.headers_mut() = headers;
        response
    }
}
