//! Per-request context handed down the proxy chain.

use tokio_util::sync::CancellationToken;

use crate::http::exchange::Exchange;

/// Request-scoped values shared by every proxy step.
///
/// Cloning is cheap: the token and the exchange are reference counted, and
/// every clone observes the same cancellation and writes to the same exchange.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
    cancel: CancellationToken,
    exchange: Option<Exchange>,
}

impl Context {
    pub fn new(request_id: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            request_id: request_id.into(),
            cancel,
            exchange: None,
        }
    }

    /// Attach the live outbound exchange for this request.
    pub fn with_exchange(mut self, exchange: Exchange) -> Self {
        self.exchange = Some(exchange);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The live outbound exchange, if the host exposes one.
    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the caller gives up on this request.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}
