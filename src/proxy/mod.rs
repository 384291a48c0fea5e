//! Proxy pipeline contract.
//!
//! # Data Flow
//! ```text
//! endpoint handler
//!     → Proxy step(s) (interceptors wrap the next step)
//!     → backend.rs (forward to the backend over HTTP)
//!     ← ProxyResponse, or ProxyFailure carrying a ProxyError
//! ```
//!
//! # Design Decisions
//! - A step is an `Arc`'d async function so wrappers compose without boxing
//!   each other's types
//! - A failure keeps whatever response the step had, so wrappers can hand the
//!   exact pair back unchanged

pub mod backend;
pub mod context;
pub mod error;
pub mod request;
pub mod response;

use std::sync::Arc;

use futures_util::future::BoxFuture;

pub use backend::{BackendStatusError, HttpBackend};
pub use context::Context;
pub use error::{ProxyError, ProxyFailure};
pub use request::ProxyRequest;
pub use response::{no_op_response_parser, Metadata, ProxyResponse};

/// Outcome of a proxy step.
pub type ProxyResult = Result<ProxyResponse, ProxyFailure>;

/// One step of the proxy chain.
pub type Proxy = Arc<dyn Fn(Context, ProxyRequest) -> BoxFuture<'static, ProxyResult> + Send + Sync>;

/// Lift an async function into a [`Proxy`].
pub fn proxy_fn<F, Fut>(f: F) -> Proxy
where
    F: Fn(Context, ProxyRequest) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ProxyResult> + Send + 'static,
{
    Arc::new(move |ctx: Context, request: ProxyRequest| -> BoxFuture<'static, ProxyResult> {
        Box::pin(f(ctx, request))
    })
}
