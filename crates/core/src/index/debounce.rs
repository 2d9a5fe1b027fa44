//! Debounced background saves.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::persist::{Persistence, PersistenceError};
use super::store::IndexStore;

#[derive(Debug, Default)]
struct SaveState {
    pending: bool,
    saves: u64,
    last_error: Option<String>,
}

/// Everything needed to write the current store contents.
///
/// Saves are serialized through `state`, and the snapshot is taken only after
/// that lock is held, so a save never writes older contents than the save
/// before it.
#[derive(Clone)]
pub(crate) struct SaveJob {
    store: Arc<RwLock<IndexStore>>,
    persistence: Arc<dyn Persistence>,
    state: Arc<Mutex<SaveState>>,
}

impl SaveJob {
    pub(crate) fn new(store: Arc<RwLock<IndexStore>>, persistence: Arc<dyn Persistence>) -> Self {
        Self { store, persistence, state: Arc::default() }
    }

    pub(crate) fn run(&self) -> Result<(), PersistenceError> {
        let mut state = self.state();
        let records = match self.store.read() {
            Ok(store) => store.snapshot(),
            Err(poisoned) => poisoned.into_inner().snapshot(),
        };

        match self.persistence.save(&records) {
            Ok(()) => {
                state.pending = false;
                state.saves += 1;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Failed to save index to {}: {e}", self.persistence.describe());
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub(crate) fn mark_pending(&self) {
        self.state().pending = true;
    }

    pub(crate) fn pending(&self) -> bool {
        self.state().pending
    }

    pub(crate) fn save_count(&self) -> u64 {
        self.state().saves
    }

    pub(crate) fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub(crate) fn persistence(&self) -> &dyn Persistence {
        self.persistence.as_ref()
    }

    fn state(&self) -> MutexGuard<'_, SaveState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug)]
enum SaverCommand {
    Schedule,
    Cancel,
}

/// Background task that saves once the store has been quiet for `delay`.
///
/// Every [`schedule`](Self::schedule) pushes the deadline back; the save
/// reads the store when the timer fires, not when it was armed.
pub(crate) struct DebouncedSaver {
    tx: mpsc::UnboundedSender<SaverCommand>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Must be called inside a tokio runtime.
    pub(crate) fn spawn(job: SaveJob, delay: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut deadline: Option<Instant> = None;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    cmd = rx.recv() => match cmd {
                        Some(SaverCommand::Schedule) => deadline = Some(Instant::now() + delay),
                        Some(SaverCommand::Cancel) => deadline = None,
                        None => break,
                    },
                    _ = wait_for(deadline) => {
                        deadline = None;
                        debug!("debounce window elapsed, saving index");
                        // Failure is logged and kept in the job state; the
                        // pending flag stays set for the next attempt.
                        let save = job.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || save.run()).await {
                            error!("save task failed: {e}");
                        }
                    }
                }
            }
            debug!("debounced saver stopped");
        });

        Self { tx, cancel, task: Some(task) }
    }

    pub(crate) fn schedule(&self) {
        if self.tx.send(SaverCommand::Schedule).is_err() {
            debug!("saver task gone, dropping schedule");
        }
    }

    /// Drop any armed timer.
    pub(crate) fn cancel(&self) {
        let _ = self.tx.send(SaverCommand::Cancel);
    }

    /// Stop the task without saving. Any armed timer is discarded.
    pub(crate) async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            error!("saver task failed: {e}");
        }
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
