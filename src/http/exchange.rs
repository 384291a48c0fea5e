//! The live outbound side of a request.
//!
//! # Responsibilities
//! - Hold status, headers and body written by in-pipeline writers
//! - Freeze status and headers at the first write (commit)
//! - Enforce the response body limit
//!
//! # Design Decisions
//! - Buffered: the host turns a committed writer into the axum response once
//!   the proxy chain returns
//! - No rollback: bytes accepted before a failed write stay in the response

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Response, StatusCode};
use bytes::{Bytes, BytesMut};
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::render::WriteTarget;

/// Status and headers as they were when the writer committed.
#[derive(Debug)]
struct Head {
    status: StatusCode,
    headers: HeaderMap,
}

/// Buffered response writer for one exchange.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    head: Option<Head>,
    body: BytesMut,
    limit: usize,
    cancel: CancellationToken,
}

impl ResponseWriter {
    /// Create a writer accepting at most `limit` body bytes.
    pub fn new(limit: usize, cancel: CancellationToken) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            head: None,
            body: BytesMut::new(),
            limit,
            cancel,
        }
    }

    /// Whether status and headers have been sent.
    pub fn is_committed(&self) -> bool {
        self.head.is_some()
    }

    pub fn written(&self) -> usize {
        self.body.len()
    }

    fn commit(&mut self) {
        if self.head.is_none() {
            self.head = Some(Head {
                status: self.status,
                headers: self.headers.clone(),
            });
        }
    }

    /// Take the committed response, leaving the writer empty.
    ///
    /// Returns `None` when nothing was committed.
    pub fn take_response(&mut self) -> Option<Response<Body>> {
        let head = self.head.take()?;
        let mut response = Response::new(Body::from(self.body.split().freeze()));
        *response.status_mut() = head.status;
        *response.headers_mut() = head.headers;
        Some(response)
    }
}

#[async_trait]
impl WriteTarget for ResponseWriter {
    fn set_status(&mut self, status: StatusCode) {
        if self.is_committed() {
            tracing::warn!(
                status = %status,
                "Ignoring status change after response was committed"
            );
            return;
        }
        self.status = status;
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write(&mut self, bytes: Bytes) -> io::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "exchange closed"));
        }
        self.commit();

        if self.body.len() + bytes.len() > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("response body exceeds {} bytes", self.limit),
            ));
        }
        self.body.extend_from_slice(&bytes);
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "exchange closed"));
        }
        self.commit();
        Ok(())
    }
}

/// Shared handle to the writer of one exchange, carried in the request context.
#[derive(Debug, Clone)]
pub struct Exchange {
    writer: Arc<Mutex<ResponseWriter>>,
}

impl Exchange {
    pub fn new(writer: ResponseWriter) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Exclusive access to the writer.
    pub async fn lock(&self) -> MutexGuard<'_, ResponseWriter> {
        self.writer.lock().await
    }

    /// Take the committed response, if any writer committed one.
    pub async fn take_response(&self) -> Option<Response<Body>> {
        self.writer.lock().await.take_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn writer(limit: usize) -> ResponseWriter {
        ResponseWriter::new(limit, CancellationToken::new())
    }

    #[tokio::test]
    async fn untouched_writer_has_no_response() {
        let mut w = writer(16);
        w.set_status(StatusCode::NOT_FOUND);
        assert!(!w.is_committed());
        assert!(w.take_response().is_none());
    }

    #[tokio::test]
    async fn first_write_commits_head() {
        let mut w = writer(16);
        w.set_status(StatusCode::NOT_FOUND);
        w.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        w.write(Bytes::from_static(b"gone")).await.unwrap();

        w.set_status(StatusCode::OK);
        w.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        w.write(Bytes::from_static(b"!")).await.unwrap();

        let response = w.take_response().unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"gone!");
    }

    #[tokio::test]
    async fn flush_commits_without_body() {
        let mut w = writer(16);
        w.set_status(StatusCode::NO_CONTENT);
        w.flush().await.unwrap();

        let response = w.take_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn oversized_write_fails_after_commit() {
        let mut w = writer(4);
        w.write(Bytes::from_static(b"abc")).await.unwrap();
        let err = w.write(Bytes::from_static(b"de")).await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert!(w.is_committed());
        assert_eq!(w.written(), 3);
    }

    #[tokio::test]
    async fn closed_exchange_rejects_writes() {
        let token = CancellationToken::new();
        let mut w = ResponseWriter::new(16, token.clone());
        token.cancel();

        let err = w.write(Bytes::from_static(b"late")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!w.is_committed());
    }

    #[tokio::test]
    async fn exchange_shares_one_writer() {
        let exchange = Exchange::new(writer(16));
        let clone = exchange.clone();
        clone.lock().await.write(Bytes::from_static(b"hi")).await.unwrap();

        let response = exchange.take_response().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(exchange.take_response().await.is_none());
    }
}
