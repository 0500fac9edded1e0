use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::storage::{Namespace, PasteBackend};

use super::types::WorkerError;

/// Wipes a whole namespace on a fixed interval. Used with the volatile
/// backend, where this is the only form of expiry.
pub struct PurgeWorker {
    backend: Arc<dyn PasteBackend>,
    namespace: Namespace,
    interval: Duration,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl PurgeWorker {
    pub fn new(backend: Arc<dyn PasteBackend>, namespace: Namespace, interval_sec: u64) -> Self {
        Self::with_interval(backend, namespace, Duration::from_secs(interval_sec))
    }

    pub fn with_interval(backend: Arc<dyn PasteBackend>, namespace: Namespace, interval: Duration) -> Self {
        Self {
            backend,
            namespace,
            interval,
            shutdown_tx: None,
        }
    }

    pub fn start(&mut self) -> Result<tokio::task::JoinHandle<()>, WorkerError> {
        if self.shutdown_tx.is_some() {
            return Err(WorkerError::AlreadyRunning("purge worker"));
        }
        let (tx, rx) = oneshot::channel();
        self.shutdown_tx = Some(tx);

        let backend = self.backend.clone();
        let namespace = self.namespace;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            tokio::pin!(rx);
            loop {
                tokio::select! {
                    _ = sleep(interval) => {
                        let backend = backend.clone();
                        let result = tokio::task::spawn_blocking(move || backend.clear(namespace)).await;
                        match result {
                            Ok(Ok(())) => tracing::info!(namespace = %namespace, "Namespace purged"),
                            Ok(Err(e)) => tracing::error!(namespace = %namespace, "Failed to purge namespace: {}", e),
                            Err(e) => tracing::error!(namespace = %namespace, "Purge task failed: {}", e),
                        }
                    }
                    _ = &mut rx => {
                        tracing::info!(namespace = %namespace, "Purge worker shutting down");
                        break;
                    }
                }
            }
        });

        Ok(handle)
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
