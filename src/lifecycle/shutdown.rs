//! Stop signal shared by the listener and the signal handler.
//!
//! `serve` holds the `Shutdown`; `HttpServer::run` holds a receiver and stops
//! accepting connections once it fires, then lets in-flight delegations
//! finish.

use tokio::sync::broadcast;

/// Cloneable handle that fans one stop request out to every receiver.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for [`wait_for`]. Only triggers sent after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every receiver to stop. Calling it with no receivers is harmless.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Receivers not yet dropped.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once the coordinator fires (or every sender is gone).
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    // Lagged means a trigger was sent; Closed means nobody can send one.
    let _ = rx.recv().await;
}
