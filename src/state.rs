// src/state.rs

use std::sync::Arc;

use crate::archive::MessageArchive;
use crate::registry::PresenceRegistry;

/// The application's shared state, created once at startup and handed to
/// every connection via axum's state management. Holding the registry and
/// archive here (instead of in globals) lets tests build isolated worlds.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PresenceRegistry>,
    pub archive: Arc<MessageArchive>,
}

impl AppState {
    /// Fresh state with an empty archive.
    pub fn new() -> Self {
        Self::with_archive(Arc::new(MessageArchive::new()))
    }

    /// State around an existing archive, e.g. one restored from a snapshot.
    pub fn with_archive(archive: Arc<MessageArchive>) -> Self {
        Self {
            registry: Arc::new(PresenceRegistry::new()),
            archive,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
