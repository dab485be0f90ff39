// src/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::channel::ClientChannel;
use crate::error::JoinError;

/// Who is connected right now: nickname to active channel.
///
/// The map is only touched inside `join` and `leave`, both of which hold the
/// lock for the duration of the mutation and never across an await point. At
/// any instant its key set equals the set of nicknames with a live, registered
/// connection.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: Mutex<HashMap<String, ClientChannel>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a nickname. A nickname that is already present is rejected;
    /// the existing session keeps its entry.
    ///
    /// The returned guard removes the entry when dropped, so the session's
    /// exit path (normal close, error, or task cancellation) always runs
    /// `leave` exactly once.
    pub fn join(
        self: &Arc<Self>,
        nickname: &str,
        channel: ClientChannel,
    ) -> Result<PresenceGuard, JoinError> {
        let id = channel.id();
        {
            let mut entries = self.entries.lock();
            if entries.contains_key(nickname) {
                return Err(JoinError::NicknameTaken(nickname.to_string()));
            }
            entries.insert(nickname.to_string(), channel);
        }
        info!(nickname, "client joined");
        Ok(PresenceGuard {
            registry: Arc::clone(self),
            nickname: nickname.to_string(),
            id,
        })
    }

    /// Removes a nickname, but only if the registered channel still belongs
    /// to the departing connection. A leave that races with a successor
    /// re-using the nickname must not evict the successor's entry.
    fn leave(&self, nickname: &str, id: Uuid) {
        let removed = {
            let mut entries = self.entries.lock();
            match entries.get(nickname) {
                Some(current) if current.id() == id => {
                    entries.remove(nickname);
                    true
                }
                _ => false,
            }
        };
        if removed {
            info!(nickname, "client left");
        } else {
            debug!(nickname, "stale leave ignored");
        }
    }

    /// Point-in-time snapshot of present nicknames.
    pub fn members(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Point-in-time snapshot of recipients for a broadcast.
    pub fn channels(&self) -> Vec<(String, ClientChannel)> {
        self.entries
            .lock()
            .iter()
            .map(|(nickname, channel)| (nickname.clone(), channel.clone()))
            .collect()
    }

    pub fn is_present(&self, nickname: &str) -> bool {
        self.entries.lock().contains_key(nickname)
    }
}

/// Scoped presence: dropping the guard deregisters the session.
#[derive(Debug)]
pub struct PresenceGuard {
    registry: Arc<PresenceRegistry>,
    nickname: String,
    id: Uuid,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        self.registry.leave(&self.nickname, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channel;

    #[test]
    fn join_registers_and_drop_deregisters() {
        let registry = Arc::new(PresenceRegistry::new());
        let (ch, _rx) = channel(8);
        let guard = registry.join("JohnDoe", ch).unwrap();
        assert_eq!(registry.members(), vec!["JohnDoe".to_string()]);
        drop(guard);
        assert!(registry.members().is_empty());
    }

    #[test]
    fn duplicate_nickname_is_rejected() {
        let registry = Arc::new(PresenceRegistry::new());
        let (first, _rx1) = channel(8);
        let _guard = registry.join("JohnDoe", first).unwrap();

        let (second, _rx2) = channel(8);
        let err = registry.join("JohnDoe", second).unwrap_err();
        assert!(matches!(err, JoinError::NicknameTaken(name) if name == "JohnDoe"));
        // The first session keeps its entry.
        assert!(registry.is_present("JohnDoe"));
    }

    #[test]
    fn members_track_every_join_and_leave() {
        let registry = Arc::new(PresenceRegistry::new());
        let (a, _rx_a) = channel(8);
        let (b, _rx_b) = channel(8);
        let guard_a = registry.join("JohnDoe", a).unwrap();
        let _guard_b = registry.join("JonSnow", b).unwrap();

        let mut members = registry.members();
        members.sort();
        assert_eq!(members, vec!["JohnDoe".to_string(), "JonSnow".to_string()]);

        drop(guard_a);
        assert_eq!(registry.members(), vec!["JonSnow".to_string()]);
    }

    #[test]
    fn leave_with_foreign_id_is_a_noop() {
        let registry = Arc::new(PresenceRegistry::new());
        let (ch, _rx) = channel(8);
        let _guard = registry.join("JohnDoe", ch).unwrap();

        registry.leave("JohnDoe", Uuid::new_v4());
        assert!(registry.is_present("JohnDoe"));
    }

    #[test]
    fn stale_leave_does_not_evict_successor() {
        let registry = Arc::new(PresenceRegistry::new());
        let (first, _rx1) = channel(8);
        let first_id = first.id();
        let guard = registry.join("JohnDoe", first).unwrap();
        drop(guard);

        // The nickname is re-used by a new session; a late duplicate of the
        // first session's cleanup must leave it alone.
        let (second, _rx2) = channel(8);
        let _guard = registry.join("JohnDoe", second).unwrap();
        registry.leave("JohnDoe", first_id);
        assert!(registry.is_present("JohnDoe"));
    }

    #[test]
    fn channels_snapshot_includes_every_member() {
        let registry = Arc::new(PresenceRegistry::new());
        let (a, _rx_a) = channel(8);
        let (b, _rx_b) = channel(8);
        let _guard_a = registry.join("JohnDoe", a).unwrap();
        let _guard_b = registry.join("JonSnow", b).unwrap();

        let mut names: Vec<String> = registry
            .channels()
            .into_iter()
            .map(|(nickname, _)| nickname)
            .collect();
        names.sort();
        assert_eq!(names, vec!["JohnDoe".to_string(), "JonSnow".to_string()]);
    }
}
