//! Error rendering interceptor.
//!
//! # Data Flow
//! ```text
//! handler factory (host)
//!     → ErrorRendering decorates it (same factory shape)
//!     → every proxy step it hands out is wrapped by render_errors
//!
//! per request:
//!     next step → Ok                    → returned as is
//!               → Err, not renderable   → returned as is
//!               → Err, renderable       → Synthesize: rendered response, error cleared
//!                                         (original pair if rendering fails)
//!                                       → DirectWrite: written to the exchange,
//!                                         original pair returned either way
//! ```
//!
//! # Design Decisions
//! - One strategy per interceptor, fixed at construction
//! - Opaque errors are neither inspected nor logged here
//! - DirectWrite leaves the error in place so the host still logs and counts
//!   it; the host must serve the written response instead of its own error
//!   page (see `http::handler`), or the client would get two responses

pub mod factory;
pub mod proxy;
pub mod strategy;

pub use factory::{new, ErrorRendering};
pub use proxy::render_errors;
pub use strategy::RenderStrategy;
