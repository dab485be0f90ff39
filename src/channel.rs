// src/channel.rs

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::SendError;
use crate::models::ChatMessage;

/// The send half of one client's connection.
///
/// Messages pushed here are drained by the connection's writer task, which
/// serializes them onto the websocket. The handle is cheap to clone; the
/// presence registry and the broadcaster both hold clones. Every clone shares
/// the same connection id, which the registry uses to tell a live entry from
/// a stale one.
#[derive(Debug, Clone)]
pub struct ClientChannel {
    id: Uuid,
    tx: mpsc::Sender<ChatMessage>,
}

/// Creates a channel pair: the client-facing handle and the receiver the
/// writer task drains.
pub fn channel(capacity: usize) -> (ClientChannel, mpsc::Receiver<ChatMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        ClientChannel {
            id: Uuid::new_v4(),
            tx,
        },
        rx,
    )
}

impl ClientChannel {
    /// Identity of the connection this handle belongs to.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queues a message for delivery, waiting for buffer space if the writer
    /// is behind. Fails once the peer is gone and the receiver has dropped.
    pub async fn send(&self, msg: ChatMessage) -> Result<(), SendError> {
        self.tx.send(msg).await.map_err(|_| SendError::Closed)
    }
}
