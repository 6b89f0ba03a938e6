//! Listener, accept loop and graceful shutdown.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use capture_config::ServerConfig;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::shutdown::{ConnectionTracker, ShutdownSignal};
use crate::{CaptureService, ServerError};

/// The capture HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    service: Arc<CaptureService>,
}

impl Server {
    /// Creates a server; nothing is bound until it runs.
    #[must_use]
    pub fn new(config: ServerConfig, service: CaptureService) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }

    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidAddress`] or [`ServerError::Bind`].
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.socket_addr();
        let socket: SocketAddr = addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(addr.clone()))?;
        TcpListener::bind(socket)
            .await
            .map_err(|source| ServerError::Bind { addr, source })
    }

    /// Serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, ShutdownSignal::with_os_signals()).await
    }

    /// Serves on `listener` until `shutdown` fires, then waits up to the
    /// shutdown timeout for open connections and closes the store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the listener's address is unavailable.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            route = self.service.route(),
            "capture server listening"
        );

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let service = Arc::clone(&self.service);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            serve_connection(service, stream, remote, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let timeout = self.config.shutdown_timeout();
        tracing::info!(
            open = tracker.active_connections(),
            timeout = ?timeout,
            "waiting for open connections"
        );
        if tokio::time::timeout(timeout, tracker.wait_idle()).await.is_err() {
            tracing::warn!(
                open = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        self.service.close();
        tracing::info!("capture server stopped");
        Ok(())
    }
}

async fn serve_connection(
    service: Arc<CaptureService>,
    stream: TcpStream,
    remote: SocketAddr,
    shutdown: ShutdownSignal,
) {
    let io = TokioIo::new(stream);
    let handler = service_fn(move |request: http::Request<Incoming>| {
        let service = Arc::clone(&service);
        async move { Ok::<_, Infallible>(service.handle(request).await) }
    });

    let connection = http1::Builder::new().serve_connection(io, handler);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => {
            if let Err(e) = result {
                tracing::debug!(remote = %remote, error = %e, "connection error");
            }
        }
        () = shutdown.recv() => {
            // Finish the in-flight request, then close.
            connection.as_mut().graceful_shutdown();
            if let Err(e) = connection.await {
                tracing::debug!(remote = %remote, error = %e, "connection error during shutdown");
            }
        }
    }
}
