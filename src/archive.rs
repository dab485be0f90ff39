// src/archive.rs

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{RestoreError, SnapshotError};
use crate::models::{ChatMessage, now_ts};

/// How long a message stays in the archive.
pub const RETENTION: Duration = Duration::from_secs(600);

/// Insertion-ordered log of chat messages with a rolling retention window.
///
/// Messages are ordered by when they were recorded, never by timestamp, so a
/// non-monotonic clock (or externally supplied timestamps) cannot reorder the
/// log. Reading the window evicts stale entries from the backing store rather
/// than filtering them out.
#[derive(Debug, Default)]
pub struct MessageArchive {
    messages: Mutex<VecDeque<ChatMessage>>,
}

impl MessageArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the end of the log.
    pub fn record(&self, msg: ChatMessage) {
        self.messages.lock().push_back(msg);
    }

    /// Evicts everything older than the retention cutoff, then returns the
    /// remaining messages in insertion order. Eviction and read happen under
    /// one lock acquisition, so concurrent callers never observe a partially
    /// pruned store.
    pub fn window(&self) -> Vec<ChatMessage> {
        let cutoff = now_ts() - RETENTION.as_secs_f64();
        let mut messages = self.messages.lock();
        messages.retain(|msg| msg.timestamp >= cutoff);
        messages.iter().cloned().collect()
    }

    /// Evicts stale entries without reading. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let cutoff = now_ts() - RETENTION.as_secs_f64();
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|msg| msg.timestamp >= cutoff);
        before - messages.len()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Serializes the full current log to `path` as a JSON array.
    ///
    /// The snapshot is written to a temporary file and renamed over the
    /// target, so a crash mid-write cannot leave a truncated file behind for
    /// the next startup to choke on.
    pub async fn snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let entries: Vec<ChatMessage> = {
            let messages = self.messages.lock();
            messages.iter().cloned().collect()
        };
        let json = serde_json::to_vec(&entries)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Replaces the log with the contents of a prior snapshot.
    ///
    /// A missing file is an expected cold start and leaves the archive empty;
    /// a file that exists but does not parse is a fatal load error for the
    /// operator to sort out. Returns the number of messages restored.
    pub async fn restore(&self, path: &Path) -> Result<usize, RestoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no archive snapshot found, starting empty");
                return Ok(0);
            }
            Err(err) => return Err(RestoreError::Io(err)),
        };
        let entries: Vec<ChatMessage> = serde_json::from_slice(&bytes)?;
        let count = entries.len();
        *self.messages.lock() = entries.into();
        Ok(count)
    }
}

/// Starts the periodic persistence task: every `every`, prune the archive and
/// snapshot it to `path`. Write failures are logged and retried on the next
/// tick. The task runs for the life of the process; the returned handle lets
/// an embedder stop it.
pub fn spawn_snapshot_task(
    archive: Arc<MessageArchive>,
    path: PathBuf,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick of an interval completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = archive.prune();
            if evicted > 0 {
                debug!(evicted, "evicted stale messages from archive");
            }
            match archive.snapshot(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), messages = archive.len(), "archive snapshot written");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "archive snapshot failed");
                }
            }
        }
    })
}
