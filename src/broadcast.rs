// src/broadcast.rs

use futures_util::future;
use tracing::{debug, warn};

use crate::channel::ClientChannel;
use crate::models::ChatMessage;

/// Fans a message out to every channel in the recipient snapshot.
///
/// All sends are issued concurrently; a recipient whose channel has failed is
/// logged and skipped, and can neither delay delivery to the others nor
/// surface an error to the session that sent the message. Returns how many
/// recipients were delivered to.
pub async fn broadcast(msg: &ChatMessage, recipients: Vec<(String, ClientChannel)>) -> usize {
    let total = recipients.len();
    let sends = recipients.into_iter().map(|(nickname, channel)| {
        let msg = msg.clone();
        async move { (nickname, channel.send(msg).await) }
    });

    let mut delivered = 0;
    for (nickname, result) in future::join_all(sends).await {
        match result {
            Ok(()) => delivered += 1,
            Err(err) => warn!(%nickname, error = %err, "skipping undeliverable recipient"),
        }
    }
    debug!(delivered, total, author = %msg.author, "broadcast message");
    delivered
}
