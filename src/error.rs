// src/error.rs

use thiserror::Error;

/// Failure to deliver a message to a client's channel.
///
/// Fatal for the session that owns the channel; tolerated and logged by the
/// broadcaster.
#[derive(Debug, Error)]
pub enum SendError {
    /// The peer is gone: nothing is draining the channel anymore.
    #[error("client channel closed")]
    Closed,
}

/// Failure to register a nickname in the presence registry.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("nickname {0:?} is already taken")]
    NicknameTaken(String),
}

/// Failure to write an archive snapshot. Logged and retried on the next tick.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize archive: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to load an archive snapshot at startup.
///
/// A missing file is not an error (cold start); these variants cover a file
/// that exists but cannot be read or parsed.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
