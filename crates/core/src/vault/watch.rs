//! Live change stream over a notes directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::source::ChangeEvent;
use super::walker::{NotesWalker, WalkError};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to watch {path}: {source}")]
    Notify {
        path: String,
        #[source]
        source: notify::Error,
    },
}

/// Handle for a running watch task. Dropping it stops the stream.
pub struct NotesWatcher {
    _watcher: RecommendedWatcher,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl NotesWatcher {
    /// Start watching `root` recursively.
    ///
    /// Must be called inside a tokio runtime. Events are delivered in the order
    /// the OS reported them; non-note paths and excluded folders are filtered.
    pub fn spawn(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChangeEvent>), WatchError> {
        let walker = Arc::new(NotesWalker::with_exclusions(root, excluded_folders)?);
        let root = walker.root().to_path_buf();

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<Event>();
        let mut watcher = notify::recommended_watcher(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if raw_tx.send(event).is_err() {
                        debug!("watch receiver closed, dropping file event");
                    }
                }
                Err(e) => error!("File watch error: {e}"),
            },
        )
        .map_err(|source| WatchError::Notify { path: root.display().to_string(), source })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Notify { path: root.display().to_string(), source })?;

        info!("Watching notes under {}", root.display());

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("notes watcher cancelled");
                        break;
                    }
                    received = raw_rx.recv() => {
                        let Some(event) = received else { break };
                        let walker = walker.clone();
                        let changes = match tokio::task::spawn_blocking(move || {
                            translate(&walker, event)
                        })
                        .await
                        {
                            Ok(changes) => changes,
                            Err(e) => {
                                error!("failed to read changed notes: {e}");
                                continue;
                            }
                        };
                        for change in changes {
                            if tx.send(change).is_err() {
                                debug!("change receiver dropped, stopping watcher");
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher, cancel, task: Some(task) }, rx))
    }

    /// Stop the stream and wait for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for NotesWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Map one notify event to zero or more change events.
///
/// The current state of the file decides the kind: a readable file is a
/// change, a missing one a removal. This covers renames reported as a single
/// event with both paths.
fn translate(walker: &NotesWalker, event: Event) -> Vec<ChangeEvent> {
    if matches!(event.kind, EventKind::Access(_) | EventKind::Other) {
        return Vec::new();
    }

    let mut changes = Vec::new();
    for path in event.paths {
        let Some(relative) = walker.relative_note_path(&path) else {
            continue;
        };

        if path.is_file() {
            match std::fs::read(&path) {
                Ok(raw) => changes.push(ChangeEvent::Changed { path: relative, raw }),
                Err(e) => debug!("skipping unreadable {relative}: {e}"),
            }
        } else if !path.exists() {
            changes.push(ChangeEvent::Removed { path: relative });
        }
    }
    changes
}
