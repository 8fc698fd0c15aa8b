//! One-shot frame subscriptions.
//!
//! A socket implementation embeds a [`FrameEvents`] hub and calls
//! [`FrameEvents::publish`] whenever a frame arrives. Readers register
//! interest with [`FrameEvents::subscribe`]; each registration receives at
//! most one frame and is removed from the hub when it fires or when the
//! [`FrameSubscription`] is dropped.
//!
//! ```text
//! socket read side ─► publish(frame) ─► oneshot::Sender ─► FrameSubscription
//!                                        (removed on fire or drop)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::oneshot;

use crate::protocol::Frame;

/// Registered listeners, keyed by subscription id.
#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: Vec<(u64, oneshot::Sender<Frame>)>,
    shut_down: bool,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // Nothing in the table can be left half-updated by a panic.
    listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Frame-arrival hub shared between a socket and its readers.
#[derive(Debug, Clone, Default)]
pub struct FrameEvents {
    listeners: Arc<Mutex<Listeners>>,
}

impl FrameEvents {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the next published frame.
    ///
    /// After [`shutdown`](Self::shutdown) the returned subscription is
    /// already closed.
    pub fn subscribe(&self) -> FrameSubscription {
        let (tx, rx) = oneshot::channel();
        let mut listeners = lock(&self.listeners);

        let id = listeners.next_id;
        listeners.next_id = listeners.next_id.wrapping_add(1);
        if !listeners.shut_down {
            listeners.senders.push((id, tx));
        }

        FrameSubscription {
            id,
            rx,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver a frame to every registered subscription.
    ///
    /// All registrations are consumed. Returns the number of subscriptions
    /// that received the frame; with no live registration the frame is
    /// dropped.
    ///
    /// Sends happen under the registry lock, so a subscription that is
    /// cancelled concurrently either never sees the frame or finds it in
    /// its channel.
    pub fn publish(&self, frame: Frame) -> usize {
        let mut listeners = lock(&self.listeners);

        let mut delivered = 0;
        for (_, tx) in listeners.senders.drain(..) {
            if tx.send(frame.clone()).is_ok() {
                delivered += 1;
            }
        }
        drop(listeners);

        if delivered == 0 {
            tracing::trace!(
                "Dropping {} frame ({} bytes), no listener registered",
                frame.opcode,
                frame.payload_len()
            );
        }

        delivered
    }

    /// Close every registration and refuse new ones.
    ///
    /// Pending and future subscriptions resolve to `None`.
    pub fn shutdown(&self) {
        let mut listeners = lock(&self.listeners);
        listeners.shut_down = true;
        listeners.senders.clear();
    }

    /// Check if the hub was shut down.
    pub fn is_shut_down(&self) -> bool {
        lock(&self.listeners).shut_down
    }

    /// Number of live registrations.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).senders.len()
    }
}

/// A single registration for the next frame.
///
/// Dropping the subscription unregisters it, so a frame published later
/// goes to a newer registration instead.
#[derive(Debug)]
pub struct FrameSubscription {
    id: u64,
    rx: oneshot::Receiver<Frame>,
    listeners: Weak<Mutex<Listeners>>,
}

impl FrameSubscription {
    /// Wait for the frame.
    ///
    /// Returns `None` if the hub was shut down or dropped first.
    /// Cancel-safe: a frame that arrives is kept until the next call.
    pub async fn recv(&mut self) -> Option<Frame> {
        (&mut self.rx).await.ok()
    }

    /// Unregister, returning a frame that was delivered before removal.
    pub fn cancel(mut self) -> Option<Frame> {
        self.unregister();
        self.rx.try_recv().ok()
    }

    fn unregister(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let id = self.id;
            lock(&listeners).senders.retain(|(sid, _)| *sid != id);
        }
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        self.unregister();
    }
}
