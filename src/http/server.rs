//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build one axum route per configured endpoint
//! - Wrap the endpoint handler factory with error rendering when enabled
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::any, Router};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::handler::{EndpointHandlerFactory, HandlerFactory};
use crate::interceptor;
use crate::proxy::HttpBackend;

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server using the gateway's endpoint handler, decorated with
    /// error rendering when the configuration enables it.
    pub fn new(config: GatewayConfig) -> Self {
        let rendering = &config.error_rendering;
        let factory: Box<dyn HandlerFactory> = if rendering.enabled {
            tracing::info!(strategy = %rendering.strategy, "Error rendering enabled");
            Box::new(interceptor::new(EndpointHandlerFactory, rendering.strategy))
        } else {
            Box::new(EndpointHandlerFactory)
        };
        Self::with_factory(config, factory)
    }

    /// Create a server whose endpoint handlers come from `factory`.
    pub fn with_factory(config: GatewayConfig, factory: impl HandlerFactory) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let router = Self::build_router(&config, client, &factory);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        client: Client<HttpConnector, Body>,
        factory: &impl HandlerFactory,
    ) -> Router {
        let mut router = Router::new();

        for endpoint in &config.endpoints {
            let proxy = HttpBackend::new(client.clone(), endpoint).into_proxy();
            let handler = factory.new_handler(endpoint, proxy);

            router = router.route(
                &endpoint.path,
                any(move |request: Request<Body>| {
                    let handler = Arc::clone(&handler);
                    async move { handler(request).await }
                }),
            );

            tracing::info!(
                endpoint = %endpoint.name,
                path = %endpoint.path,
                backend = %endpoint.backend,
                "Endpoint registered"
            );
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.config.endpoints.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
