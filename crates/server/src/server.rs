//! TCP accept loop
//!
//! Binds one listener and spawns a [`Connection`] task per accepted
//! client. A connection failure is isolated to its own task; the
//! listener keeps accepting until the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use recon_config::Paths;
use recon_registry::Registry;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::error::ServerError;
use crate::metrics::ServerMetrics;

/// Listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_owned(),
            port: 9002,
        }
    }
}

/// The reconstruction server: one listener, one registry, many clients
pub struct Server {
    listener: TcpListener,
    paths: Paths,
    registry: Arc<Registry>,
    metrics: Arc<ServerMetrics>,
}

impl Server {
    /// Bind the listener
    ///
    /// Binding and accepting are separate so callers can bind port 0
    /// and discover the assigned port via [`Server::local_addr`].
    pub async fn bind(
        config: ServerConfig,
        paths: Paths,
        registry: Arc<Registry>,
    ) -> Result<Self, ServerError> {
        let address = format!("{}:{}", config.address, config.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;

        Ok(Self {
            listener,
            paths,
            registry,
            metrics: Arc::new(ServerMetrics::new()),
        })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Accept clients until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServerError> {
        info!(address = %self.local_addr()?, "listening for client connections");

        loop {
            let (stream, peer) = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(error) => {
                        warn!(%error, "accept failed");
                        continue;
                    }
                },
            };

            if let Err(error) = configure_socket(&stream) {
                warn!(%peer, %error, "failed to tune client socket");
            }

            self.metrics.connection_opened();
            let connection = Connection::new(
                self.paths.clone(),
                Arc::clone(&self.registry),
                Arc::clone(&self.metrics),
            );
            let metrics = Arc::clone(&self.metrics);
            let cancel = cancel.clone();

            tokio::spawn(async move {
                debug!(%peer, "client connected");
                match connection.run(stream, cancel).await {
                    Ok(()) => info!(%peer, "connection closed"),
                    Err(error) if error.is_disconnect() => {
                        debug!(%peer, %error, "client disconnected");
                    }
                    Err(error) => {
                        metrics.connection_failed();
                        warn!(%peer, %error, "connection failed");
                    }
                }
                metrics.connection_closed();
            });
        }

        let snapshot = self.metrics.snapshot();
        info!(
            connections = snapshot.connections_total,
            messages = snapshot.messages_received,
            errors = snapshot.connection_errors,
            "server stopped"
        );
        Ok(())
    }
}

/// Per-client socket tuning: low latency, dead peers detected
fn configure_socket(stream: &TcpStream) -> std::io::Result<()> {
    let socket = SockRef::from(stream);
    socket.set_nodelay(true)?;

    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(60))
        .with_interval(Duration::from_secs(10));
    socket.set_tcp_keepalive(&keepalive)?;

    Ok(())
}
