//! Test double for driving the reader without a network.
//!
//! [`ScriptedSocket`] replays a queue of frames: every time a reader
//! subscribes, the next scripted entry is published to it. A `None` entry
//! (or an exhausted script) publishes nothing, so that receive times out.
//!
//! # Example
//!
//! ```
//! use wsreader::protocol::{Frame, Message, Opcode};
//! use wsreader::testing::ScriptedSocket;
//! use wsreader::{read_message, DisconnectToken};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let socket = ScriptedSocket::new(vec![
//!     Frame::fragment(Opcode::Text, "hel"),
//!     Frame::continuation("lo ", false),
//!     Frame::text("world"),
//! ]);
//!
//! let message = read_message(&socket, 4096, Some(1024), &DisconnectToken::new())
//!     .await
//!     .unwrap();
//! assert_eq!(message, Some(Message::Text("hello world".into())));
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, WsReaderError};
use crate::protocol::Frame;
use crate::socket::{CloseCode, FrameEvents, FrameSubscription, WebSocket, DEFAULT_WAIT_TIME};

/// A [`WebSocket`] that replays scripted frames.
#[derive(Debug)]
pub struct ScriptedSocket {
    events: FrameEvents,
    script: Mutex<VecDeque<Option<Frame>>>,
    closes: Mutex<Vec<(CloseCode, String)>>,
    wait_time: Duration,
}

impl ScriptedSocket {
    /// Socket that delivers `frames` in order, one per receive.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self::from_script(frames.into_iter().map(Some).collect())
    }

    /// Socket with explicit silent receives (`None` entries).
    pub fn from_script(script: Vec<Option<Frame>>) -> Self {
        Self {
            events: FrameEvents::new(),
            script: Mutex::new(script.into()),
            closes: Mutex::new(Vec::new()),
            wait_time: DEFAULT_WAIT_TIME,
        }
    }

    /// Override the per-receive wait time.
    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    /// Append a frame to the end of the script.
    pub fn push(&self, frame: Frame) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Some(frame));
    }

    /// Number of scripted entries not yet delivered.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// The frame hub backing this socket.
    pub fn events(&self) -> &FrameEvents {
        &self.events
    }

    /// Live frame registrations.
    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    /// Every close requested so far, in order.
    pub fn closes(&self) -> Vec<(CloseCode, String)> {
        self.closes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl WebSocket for ScriptedSocket {
    fn subscribe(&self) -> FrameSubscription {
        let subscription = self.events.subscribe();

        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .flatten();
        if let Some(frame) = next {
            self.events.publish(frame);
        }

        subscription
    }

    fn wait_time(&self) -> Duration {
        self.wait_time
    }

    async fn close(&self, code: CloseCode, reason: &str) -> Result<()> {
        if self.events.is_shut_down() {
            return Err(WsReaderError::ConnectionClosed);
        }

        self.closes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((code, reason.to_string()));
        self.events.shutdown();
        Ok(())
    }
}
