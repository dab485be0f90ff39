// src/models.rs

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A chat message as archived and as sent to clients.
/// Serialized into JSON as `{"message": ..., "from": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "message")]
    pub body: String,
    #[serde(rename = "from")]
    pub author: String,
    /// Unix seconds, assigned by the server at receipt time.
    pub timestamp: f64,
}

impl ChatMessage {
    /// Builds a message stamped with the current time.
    pub fn new(body: String, author: String) -> Self {
        Self {
            body,
            author,
            timestamp: now_ts(),
        }
    }
}

/// A message sent from a client to the server.
/// Any extra fields the client supplies (e.g. "from", "timestamp") are
/// ignored; the server assigns both itself.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub message: String,
}

/// Current unix time as fractional seconds.
pub fn now_ts() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs_f64()
}
