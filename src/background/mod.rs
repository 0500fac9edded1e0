pub mod commit;
pub mod purge;
pub mod types;

use std::sync::Arc;

use crate::storage::{BackendKind, Namespace, PasteBackend, StorageConfig};

pub use commit::{CommitScheduler, DirtyFlag};
pub use purge::PurgeWorker;
pub use types::WorkerError;

pub struct WorkerManager {
    commit: CommitScheduler,
    purge: Vec<PurgeWorker>,
}

impl WorkerManager {
    /// Starts the commit scheduler and, for the volatile backend, the
    /// public/private purge workers.
    pub fn start(
        mut commit: CommitScheduler,
        backend: Arc<dyn PasteBackend>,
        storage: &StorageConfig,
    ) -> Result<Self, WorkerError> {
        commit.start()?;

        let mut purge = Vec::new();
        if storage.backend == BackendKind::Memory {
            for (namespace, interval) in [
                (Namespace::Public, storage.public_clear_interval_sec),
                (Namespace::Private, storage.private_clear_interval_sec),
            ] {
                let mut worker = PurgeWorker::new(backend.clone(), namespace, interval);
                worker.start()?;
                purge.push(worker);
            }
        }

        Ok(Self { commit, purge })
    }

    pub fn shutdown(&mut self) {
        self.commit.shutdown();
        for worker in &mut self.purge {
            worker.shutdown();
        }
    }
}
