//! Socket module - the boundary with the underlying WebSocket.
//!
//! The socket itself (connect, handshake, TLS, wire framing) lives outside
//! this crate. It plugs in by implementing [`WebSocket`]:
//! - frame delivery through a [`FrameEvents`] hub
//! - a per-receive wait time
//! - an async close

mod cancel;
mod close;
mod events;
mod receive;

use std::future::Future;
use std::time::Duration;

pub use cancel::DisconnectToken;
pub use close::CloseCode;
pub use events::{FrameEvents, FrameSubscription};
pub use receive::receive_frame;

use crate::error::Result;

/// Default time a single receive waits for a frame.
pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(5);

/// A connected WebSocket that delivers frames as events.
///
/// Implementations typically own a [`FrameEvents`] hub, publish every
/// frame their read side decodes, and return `events.subscribe()` from
/// [`subscribe`](Self::subscribe).
pub trait WebSocket: Send + Sync {
    /// Register interest in the next frame.
    fn subscribe(&self) -> FrameSubscription;

    /// How long one receive waits before giving up.
    fn wait_time(&self) -> Duration {
        DEFAULT_WAIT_TIME
    }

    /// Start the close handshake and wait for it to complete.
    fn close(&self, code: CloseCode, reason: &str) -> impl Future<Output = Result<()>> + Send;
}
