//! Error rendering for a proxying HTTP gateway.
//!
//! Backend failures that describe their own HTTP response (status, content
//! type, body) are turned into that response instead of a generic error page.

pub mod config;
pub mod http;
pub mod interceptor;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod render;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use interceptor::RenderStrategy;
pub use lifecycle::Shutdown;
pub use render::RenderableError;
