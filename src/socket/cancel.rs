//! Disconnect-driven cancellation.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation signal fired when the connection is being torn down.
///
/// Cheaply cloneable; all clones observe the same state. Once cancelled a
/// token stays cancelled.
#[derive(Debug, Clone)]
pub struct DisconnectToken {
    tx: Arc<watch::Sender<bool>>,
}

impl DisconnectToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal, waking every waiter.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check if the signal has fired.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal fires.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for DisconnectToken {
    fn default() -> Self {
        Self::new()
    }
}
