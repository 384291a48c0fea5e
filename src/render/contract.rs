//! What an error must expose to be turned into a response.

use std::io;

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode};
use bytes::Bytes;

use crate::proxy::Context;

/// An error that describes the HTTP response it should become.
///
/// Producers pick a status in the 100–599 range.
#[async_trait]
pub trait RenderableError: std::error::Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode;

    /// Media types for the `Content-Type` header, in order. Empty leaves the
    /// header to whatever default applies.
    fn content_type(&self) -> Vec<HeaderValue>;

    /// Produce the response body. `None` means the response has no body.
    ///
    /// Called at most once per rendering attempt; implementations need not
    /// return the same bytes twice.
    async fn body(&self) -> io::Result<Option<Bytes>>;
}

/// Fetch the body, giving up as soon as the request is canceled.
pub(crate) async fn read_body(ctx: &Context, err: &dyn RenderableError) -> io::Result<Option<Bytes>> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(canceled()),
        body = err.body() => body,
    }
}

pub(crate) fn canceled() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "request canceled")
}


#[cfg(test)]
mod tests {
    use super::testing::StaticError;
    use super::*;
    use crate::proxy::ProxyError;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn classification_is_stable() {
        let renderable = ProxyError::renderable(StaticError::new(404, &[], None));
        let opaque = ProxyError::Canceled;

        for _ in 0..2 {
            assert!(renderable.as_renderable().is_some());
            assert!(opaque.as_renderable().is_none());
        }
        assert_eq!(
            renderable.as_renderable().unwrap().status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn renderable_error_displays_inner_message() {
        let err = ProxyError::renderable(StaticError::new(502, &[], None));
        assert_eq!(err.to_string(), "backend said 502 Bad Gateway");
    }

    #[tokio::test]
    async fn read_body_stops_on_cancel() {
        let token = CancellationToken::new();
        let ctx = Context::new("test", token.clone());
        token.cancel();

        let err = StaticError::new(500, &[], Some("late"));
        let result = read_body(&ctx, &err).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::Interrupted);
        assert_eq!(err.body_calls(), 0);
    }
}
