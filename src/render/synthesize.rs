//! Response synthesis: turn a renderable error into a response value.
//!
//! The response re-enters the normal response path (see
//! [`no_op_response_parser`](crate::proxy::no_op_response_parser)) as if the
//! backend had returned it. Nothing touches the connection, so a failure here
//! leaves no trace on the wire.

use std::io;

use axum::body::Body;
use axum::http::{header, Response};

use crate::proxy::Context;
use crate::render::contract::{read_body, RenderableError};

/// Build the response `err` describes.
///
/// The body is fetched first; if that fails nothing is built and the caller
/// should fall back to the original error.
pub async fn synthesize(ctx: &Context, err: &dyn RenderableError) -> io::Result<Response<Option<Body>>> {
    let body = read_body(ctx, err).await?;

    let mut response = Response::new(body.map(Body::from));
    *response.status_mut() = err.status_code();

    let headers = response.headers_mut();
    for value in err.content_type() {
        headers.append(header::CONTENT_TYPE, value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::contract::testing::StaticError;
    use axum::http::StatusCode;
    use tokio_util::sync::CancellationToken;

    fn ctx() -> Context {
        Context::new("test", CancellationToken::new())
    }

    #[tokio::test]
    async fn json_not_found() {
        let err = StaticError::new(404, &["application/json"], Some(r#"{"msg":"not found"}"#));
        let response = synthesize(&ctx(), &err).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_types: Vec<_> = response.headers().get_all(header::CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, ["application/json"]);

        let body = response.into_body().unwrap();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"msg":"not found"}"#);
        assert_eq!(err.body_calls(), 1);
    }

    #[tokio::test]
    async fn bare_status_has_no_header_or_body() {
        let err = StaticError::new(500, &[], None);
        let response = synthesize(&ctx(), &err).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(response.body().is_none());
    }

    #[tokio::test]
    async fn empty_body_still_gets_a_stream() {
        let err = StaticError::new(204, &[], Some(""));
        let response = synthesize(&ctx(), &err).await.unwrap();

        let bytes = axum::body::to_bytes(response.into_body().unwrap(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn content_type_values_keep_their_order() {
        let err = StaticError::new(406, &["application/problem+json", "application/json"], Some("nope"));
        let response = synthesize(&ctx(), &err).await.unwrap();

        let content_types: Vec<_> = response.headers().get_all(header::CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, ["application/problem+json", "application/json"]);
    }

    #[tokio::test]
    async fn body_failure_builds_nothing() {
        let err = StaticError::new(404, &["application/json"], Some("{}")).failing_body();
        let result = synthesize(&ctx(), &err).await;

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(err.body_calls(), 1);
    }
}
