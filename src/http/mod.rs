//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, request ID, tracing, timeout)
//!     → handler.rs (context + exchange, buffer request, run proxy chain)
//!     → [interceptor renders errors] (when enabled)
//!     → proxy::backend (forward to backend)
//!     ← response value, or what was written to exchange.rs
//! ```

pub mod exchange;
pub mod handler;
pub mod server;

pub use exchange::{Exchange, ResponseWriter};
pub use handler::{EndpointHandlerFactory, Handler, HandlerFactory};
pub use server::GatewayServer;
