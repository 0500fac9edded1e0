use chrono::{SecondsFormat, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::secrets::{CommitOutcome, Committer, GitError};

use super::types::WorkerError;

/// Set when the secret log has changes that are not committed yet.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag and reports whether it was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct Ticker {
    committer: Arc<dyn Committer>,
    dirty: DirtyFlag,
}

impl Ticker {
    async fn fast(&self) -> Option<Result<CommitOutcome, GitError>> {
        if !self.dirty.take() {
            return None;
        }
        Some(self.commit().await)
    }

    async fn commit(&self) -> Result<CommitOutcome, GitError> {
        let message = format!(
            "Invalidate secrets at {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let result = self.committer.commit_and_push(&message).await;

        let outcome = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "failed",
        };
        crate::metrics::COMMIT_ATTEMPTS
            .with_label_values(&[outcome])
            .inc();

        result
    }
}

/// Persists the secret log to the git remote.
///
/// A fast tick commits only when the dirty flag is set; a slow tick commits
/// unconditionally to catch anything a fast tick missed. The two loops are
/// independent and may overlap, which is harmless because committing a
/// clean tree does nothing.
pub struct CommitScheduler {
    ticker: Ticker,
    fast_interval: Duration,
    slow_interval: Duration,
    shutdown_txs: Vec<oneshot::Sender<()>>,
}

impl CommitScheduler {
    pub fn new(committer: Arc<dyn Committer>, fast_interval: Duration, slow_interval: Duration) -> Self {
        Self {
            ticker: Ticker {
                committer,
                dirty: DirtyFlag::default(),
            },
            fast_interval,
            slow_interval,
            shutdown_txs: Vec::new(),
        }
    }

    pub fn dirty_flag(&self) -> DirtyFlag {
        self.ticker.dirty.clone()
    }

    pub fn mark_dirty(&self) {
        self.ticker.dirty.mark();
    }

    pub fn is_dirty(&self) -> bool {
        self.ticker.dirty.is_dirty()
    }

    /// Commits if dirty. Returns `None` when there was nothing to do.
    pub async fn fast_tick(&self) -> Option<Result<CommitOutcome, GitError>> {
        self.ticker.fast().await
    }

    pub async fn slow_tick(&self) -> Result<CommitOutcome, GitError> {
        self.ticker.commit().await
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown_txs.is_empty()
    }

    /// Spawns the fast and slow loops.
    pub fn start(&mut self) -> Result<Vec<tokio::task::JoinHandle<()>>, WorkerError> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning("commit scheduler"));
        }

        let fast = self.spawn_loop("fast", self.fast_interval, |ticker| async move {
            if let Some(Err(e)) = ticker.fast().await {
                tracing::error!("Commit after invalidation failed: {}", e);
            }
        });
        let slow = self.spawn_loop("slow", self.slow_interval, |ticker| async move {
            if let Err(e) = ticker.commit().await {
                tracing::error!("Periodic commit failed: {}", e);
            }
        });

        tracing::info!(
            fast_ms = self.fast_interval.as_millis() as u64,
            slow_ms = self.slow_interval.as_millis() as u64,
            "Commit scheduler started"
        );

        Ok(vec![fast, slow])
    }

    fn spawn_loop<F, Fut>(&mut self, name: &'static str, interval: Duration, tick: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(Ticker) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.shutdown_txs.push(tx);
        let ticker = self.ticker.clone();

        tokio::spawn(async move {
            tokio::pin!(rx);
            loop {
                tokio::select! {
                    _ = sleep(interval) => {
                        tick(ticker.clone()).await;
                    }
                    _ = &mut rx => {
                        tracing::info!(tick = name, "Commit loop shutting down");
                        break;
                    }
                }
            }
        })
    }

    pub fn shutdown(&mut self) {
        for tx in self.shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::git::tests::RecordingRunner;
    use crate::secrets::GitCommitter;
    use std::sync::atomic::AtomicUsize;

    /// Counts commits; every call reports a pushed commit.
    #[derive(Default)]
    struct CountingCommitter {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Committer for CountingCommitter {
        async fn commit_and_push(&self, _message: &str) -> Result<CommitOutcome, GitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CommitOutcome::Pushed)
        }
    }

    fn scheduler(committer: Arc<dyn Committer>, fast_ms: u64, slow_ms: u64) -> CommitScheduler {
        CommitScheduler::new(
            committer,
            Duration::from_millis(fast_ms),
            Duration::from_millis(slow_ms),
        )
    }

    #[tokio::test]
    async fn test_fast_tick_skips_when_clean() {
        let committer = Arc::new(CountingCommitter::default());
        let scheduler = scheduler(committer.clone(), 7_000, 300_000);

        assert!(scheduler.fast_tick().await.is_none());
        assert_eq!(committer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fast_tick_commits_and_clears_flag() {
        let committer = Arc::new(CountingCommitter::default());
        let scheduler = scheduler(committer.clone(), 7_000, 300_000);

        scheduler.mark_dirty();
        let outcome = scheduler.fast_tick().await.unwrap().unwrap();

        assert_eq!(outcome, CommitOutcome::Pushed);
        assert!(!scheduler.is_dirty());
        assert_eq!(committer.calls.load(Ordering::SeqCst), 1);

        // Flag is clear, so the next fast tick does nothing.
        assert!(scheduler.fast_tick().await.is_none());
        assert_eq!(committer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_tick_ignores_flag() {
        let committer = Arc::new(CountingCommitter::default());
        let scheduler = scheduler(committer.clone(), 7_000, 300_000);

        scheduler.slow_tick().await.unwrap();
        scheduler.slow_tick().await.unwrap();
        assert_eq!(committer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_tick_on_clean_tree_runs_no_commit() {
        let committer = Arc::new(GitCommitter::with_runner("/repo", None, RecordingRunner::default()));
        let scheduler = scheduler(committer.clone(), 7_000, 300_000);

        let outcome = scheduler.slow_tick().await.unwrap();

        assert_eq!(outcome, CommitOutcome::Clean);
        assert_eq!(committer.runner().subcommands(), vec!["status"]);
    }

    #[tokio::test]
    async fn test_failed_fast_tick_still_clears_flag() {
        let runner = RecordingRunner {
            fail_on: Some("push"),
            ..RecordingRunner::dirty()
        };
        let committer = Arc::new(GitCommitter::with_runner("/repo", None, runner));
        let scheduler = scheduler(committer, 7_000, 300_000);

        scheduler.mark_dirty();
        assert!(scheduler.fast_tick().await.unwrap().is_err());
        assert!(!scheduler.is_dirty());
    }

    #[tokio::test]
    async fn test_loops_fire_and_shut_down() {
        let committer = Arc::new(CountingCommitter::default());
        let mut scheduler = scheduler(committer.clone(), 10, 60_000);

        let handles = scheduler.start().unwrap();
        assert!(matches!(scheduler.start(), Err(WorkerError::AlreadyRunning(_))));

        scheduler.mark_dirty();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while scheduler.is_dirty() && tokio::time::Instant::now() < deadline {
            sleep(Duration::from_millis(5)).await;
        }
        assert!(!scheduler.is_dirty());

        scheduler.shutdown();
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(!scheduler.is_running());
        assert!(committer.calls.load(Ordering::SeqCst) >= 1);
    }
}
