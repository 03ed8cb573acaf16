//! Serialized cart persistence queue.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::users::UserUuid;

use super::{models::CartLine, store::CartStore};

enum Message {
    Persist(Vec<CartLine>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the single-writer persistence task for one user's cart.
///
/// Snapshots apply in enqueue order. Each write replaces the user's whole
/// line set, so the store converges to the last snapshot even when an
/// earlier write fails: the failure is logged and the next snapshot
/// supersedes it.
#[derive(Debug)]
pub(crate) struct CartWriter {
    tx: mpsc::UnboundedSender<Message>,
}

impl CartWriter {
    /// Spawn the writer task onto the current Tokio runtime; panics outside
    /// of one.
    pub(crate) fn spawn(store: Arc<dyn CartStore>, user: UserUuid) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        drop(tokio::spawn(run(store, user, rx)));

        Self { tx }
    }

    /// Queue a full snapshot for persistence.
    pub(crate) fn enqueue(&self, snapshot: Vec<CartLine>) {
        if self.tx.send(Message::Persist(snapshot)).is_err() {
            warn!("cart writer has shut down; dropping snapshot");
        }
    }

    /// Wait until every previously queued snapshot has been attempted
    /// against the store.
    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();

        if self.tx.send(Message::Flush(ack)).is_ok() && done.await.is_err() {
            warn!("cart writer exited before acknowledging flush");
        }
    }
}

async fn run(store: Arc<dyn CartStore>, user: UserUuid, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Persist(snapshot) => {
                let count = snapshot.len();

                if let Err(error) = store.replace_lines(user, snapshot).await {
                    // Fail-silent toward the user: the next mutation enqueues
                    // a fresh full snapshot that supersedes this one.
                    warn!(%user, count, %error, "failed to persist cart snapshot");
                }
            }
            Message::Flush(ack) => {
                // The flusher may have given up waiting; nothing to do then.
                drop(ack.send(()));
            }
        }
    }
}
