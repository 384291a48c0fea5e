//! Error rendering subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyError
//!     → contract.rs (is it a RenderableError?)
//!     → synthesize.rs (build a response value for the response path)
//!       or
//!       direct.rs (write status, headers and body onto the live exchange)
//! ```
//!
//! # Design Decisions
//! - Renderability is a trait, checked where the error is received
//! - The body is fetched once per attempt and always before anything is built
//! - Synthesis fails atomically; direct writes are not rolled back

pub mod contract;
pub mod direct;
pub mod synthesize;

pub use contract::RenderableError;
pub use direct::{render, WriteTarget};
pub use synthesize::synthesize;
