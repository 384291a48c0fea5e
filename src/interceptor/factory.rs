//! The construction-time half of the interceptor: decorates a handler factory.

use crate::config::EndpointConfig;
use crate::http::handler::{Handler, HandlerFactory};
use crate::interceptor::{render_errors, RenderStrategy};
use crate::proxy::Proxy;

/// A handler factory whose proxy steps render errors before `next` sees them.
#[derive(Debug, Clone)]
pub struct ErrorRendering<F> {
    next: F,
    strategy: RenderStrategy,
}

/// Decorate `next` with error rendering.
pub fn new<F: HandlerFactory>(next: F, strategy: RenderStrategy) -> ErrorRendering<F> {
    ErrorRendering { next, strategy }
}

impl<F> ErrorRendering<F> {
    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }
}

impl<F: HandlerFactory> HandlerFactory for ErrorRendering<F> {
    fn new_handler(&self, endpoint: &EndpointConfig, proxy: Proxy) -> Handler {
        self.next.new_handler(endpoint, render_errors(proxy, self.strategy))
    }
}
