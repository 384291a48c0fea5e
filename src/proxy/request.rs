//! Request forwarded to a backend.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Uri};
use bytes::Bytes;

use crate::proxy::ProxyError;

/// A buffered request, detached from the inbound connection.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Path and query of the inbound request.
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Buffer an inbound request, rejecting bodies over `limit` bytes.
    pub async fn from_http(request: Request<Body>, limit: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit).await.map_err(|err| {
            if std::error::Error::source(&err)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
            {
                ProxyError::PayloadTooLarge(limit)
            } else {
                ProxyError::Body(err)
            }
        })?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        })
    }

    /// Path plus query string, as sent on the request line.
    pub fn path_and_query(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[tokio::test]
    async fn body_over_limit_is_too_large() {
        let request = Request::builder().uri("/a?b=c").body(Body::from("too long")).unwrap();

        let err = ProxyRequest::from_http(request, 2).await.unwrap_err();
        assert!(matches!(err, ProxyError::PayloadTooLarge(2)), "{err}");
    }

    #[tokio::test]
    async fn aborted_body_is_a_read_failure() {
        let chunks = vec![Ok(Bytes::from_static(b"a")), Err(io::Error::other("reset"))];
        let body = Body::from_stream(futures_util::stream::iter(chunks));
        let request = Request::builder().uri("/a").body(body).unwrap();

        let err = ProxyRequest::from_http(request, 1024).await.unwrap_err();
        assert!(matches!(err, ProxyError::Body(_)), "{err}");
    }

    #[tokio::test]
    async fn keeps_path_and_query() {
        let request = Request::builder().uri("/a?b=c").body(Body::from("ok")).unwrap();

        let request = ProxyRequest::from_http(request, 1024).await.unwrap();
        assert_eq!(request.path_and_query(), "/a?b=c");
        assert_eq!(&request.body[..], b"ok");
    }
}
