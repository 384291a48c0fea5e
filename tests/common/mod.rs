//! Shared utilities for integration tests.

use std::net::SocketAddr;

use proxy_error_renderer::config::{EndpointConfig, GatewayConfig};
use proxy_error_renderer::{GatewayServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned backend reply.
#[derive(Clone, Copy)]
pub struct Reply {
    pub status: &'static str,
    pub content_type: Option<&'static str>,
    pub body: &'static str,
}

/// Start a backend that answers every request with `reply`.
pub async fn start_backend(reply: Reply) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                // Requests in these tests are small; one read covers the head.
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let content_type = reply
                    .content_type
                    .map(|ct| format!("Content-Type: {ct}\r\n"))
                    .unwrap_or_default();
                let response = format!(
                    "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    content_type,
                    reply.body.len(),
                    reply.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A running gateway bound to a random local port.
pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub async fn start(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let server = GatewayServer::new(config);
        let stop = shutdown.subscribe();

        tokio::spawn(async move {
            let _ = server.run(listener, stop).await;
        });

        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A config with one endpoint at `/api` pointing at `backend`.
pub fn config_for(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config
        .endpoints
        .push(EndpointConfig::new("api", "/api", backend.to_string()));
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
