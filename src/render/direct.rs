//! Direct rendering: write a renderable error straight onto the live exchange.
//!
//! Unlike synthesis this bypasses the response path entirely. Anything
//! written stays written; a failure halfway through is reported to the caller
//! and nothing is rolled back.

use std::io;

use async_trait::async_trait;
use axum::http::{header, HeaderMap, StatusCode};
use bytes::Bytes;

use crate::proxy::Context;
use crate::render::contract::{canceled, read_body, RenderableError};

/// The outbound side of one in-flight exchange.
///
/// Owned by the host for the duration of a request; renderers borrow it
/// mutably and never keep it.
#[async_trait]
pub trait WriteTarget: Send {
    fn set_status(&mut self, status: StatusCode);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write body bytes. The first write commits status and headers.
    async fn write(&mut self, bytes: Bytes) -> io::Result<()>;

    /// Commit status and headers even if no body was written.
    async fn flush(&mut self) -> io::Result<()>;
}

/// Write the response `err` describes to `target`.
///
/// Order is fixed: status, `Content-Type`, body. A `Content-Type` already set
/// on the target wins over the error's.
pub async fn render<W>(ctx: &Context, target: &mut W, err: &dyn RenderableError) -> io::Result<()>
where
    W: WriteTarget + ?Sized,
{
    target.set_status(err.status_code());

    let content_type = err.content_type();
    if !content_type.is_empty() && !target.headers().contains_key(header::CONTENT_TYPE) {
        let headers = target.headers_mut();
        for value in content_type {
            headers.append(header::CONTENT_TYPE, value);
        }
    }

    let body = read_body(ctx, err).await?;

    if let Some(bytes) = body {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(canceled()),
            written = target.write(bytes) => written?,
        }
    }

    target.flush().await
}
