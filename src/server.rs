use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::background::WorkerManager;

pub struct ServerHandle {
    rest_handle: JoinHandle<Result<(), std::io::Error>>,
    shutdown_tx: oneshot::Sender<()>,
    background_workers: WorkerManager,
}

/// Resolves on SIGTERM. Never resolves if the handler cannot be installed.
async fn terminate() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    std::future::pending::<()>().await;
}

impl ServerHandle {
    /// Spawns the REST server; it stops accepting connections once the
    /// handle is told to shut down.
    pub fn spawn(
        addr: std::net::SocketAddr,
        app: axum::Router,
        background_workers: WorkerManager,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let rest_handle = tokio::spawn(crate::api::rest::start_rest_server(addr, app, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            rest_handle,
            shutdown_tx,
            background_workers,
        }
    }

    pub async fn wait_for_shutdown(mut self) {
        // Wait for Ctrl+C or SIGTERM, or for the server to die on its own.
        let server_exited = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                false
            }
            _ = terminate() => {
                info!("Received SIGTERM, shutting down...");
                false
            }
            result = &mut self.rest_handle => {
                match result {
                    Ok(Ok(())) => info!("REST server stopped"),
                    Ok(Err(e)) => error!("REST server failed: {}", e),
                    Err(e) => error!("REST server task panicked: {}", e),
                }
                true
            }
        };

        self.background_workers.shutdown();

        if !server_exited {
            let _ = self.shutdown_tx.send(());
            match self.rest_handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("REST server failed during shutdown: {}", e),
                Err(e) => error!("REST server task panicked: {}", e),
            }
        }

        info!("Server shutdown complete.");
    }
}
