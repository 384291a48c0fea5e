//! The per-request half of the interceptor: wraps one proxy step.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::interceptor::RenderStrategy;
use crate::observability::metrics;
use crate::proxy::{no_op_response_parser, Context, Proxy, ProxyRequest, ProxyResult};
use crate::render::{self, RenderableError};

/// Wrap `next` so renderable errors it returns are rendered with `strategy`.
pub fn render_errors(next: Proxy, strategy: RenderStrategy) -> Proxy {
    Arc::new(move |ctx: Context, request: ProxyRequest| -> BoxFuture<'static, ProxyResult> {
        let next = Arc::clone(&next);
        Box::pin(async move { intercept(&next, strategy, ctx, request).await })
    })
}

async fn intercept(next: &Proxy, strategy: RenderStrategy, ctx: Context, request: ProxyRequest) -> ProxyResult {
    let failure = match next(ctx.clone(), request).await {
        Ok(response) => return Ok(response),
        Err(failure) => failure,
    };

    let Some(err) = failure.error.as_renderable() else {
        return Err(failure);
    };

    match strategy {
        RenderStrategy::Synthesize => {
            let rendered = synthesize(&ctx, err).await;
            rendered.unwrap_or(Err(failure))
        }
        RenderStrategy::DirectWrite => {
            write_direct(&ctx, err).await;
            Err(failure)
        }
    }
}

async fn synthesize(ctx: &Context, err: &dyn RenderableError) -> Option<ProxyResult> {
    match render::synthesize(ctx, err).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %ctx.request_id(),
                status = %response.status(),
                "Rendered error as response"
            );
            metrics::record_render(RenderStrategy::Synthesize.as_str(), "rendered");
            Some(no_op_response_parser(ctx, response))
        }
        Err(e) => {
            tracing::debug!(
                request_id = %ctx.request_id(),
                error = %e,
                "Could not read error body, keeping original error"
            );
            metrics::record_render(RenderStrategy::Synthesize.as_str(), "failed");
            None
        }
    }
}

async fn write_direct(ctx: &Context, err: &dyn RenderableError) {
    let Some(exchange) = ctx.exchange() else {
        tracing::debug!(
            request_id = %ctx.request_id(),
            "No live exchange to render onto"
        );
        metrics::record_render(RenderStrategy::DirectWrite.as_str(), "skipped");
        return;
    };

    let mut writer = exchange.lock().await;
    match render::render(ctx, &mut *writer, err).await {
        Ok(()) => {
            tracing::debug!(
                request_id = %ctx.request_id(),
                status = %err.status_code(),
                "Wrote error response to exchange"
            );
            metrics::record_render(RenderStrategy::DirectWrite.as_str(), "rendered");
        }
        Err(e) => {
            tracing::warn!(
                request_id = %ctx.request_id(),
                error = %e,
                committed = writer.is_committed(),
                "Writing error response failed"
            );
            metrics::record_render(RenderStrategy::DirectWrite.as_str(), "failed");
        }
    }
}
