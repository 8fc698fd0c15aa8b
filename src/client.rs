//! Reader builder and runtime loop.
//!
//! The [`MessageReaderBuilder`] provides a fluent API for configuring the
//! read limits. The [`MessageReader`] manages the lifecycle:
//! 1. Spawn the read loop on the socket
//! 2. Reassemble messages and forward them over a channel
//! 3. Stop on close, cancellation, or a fatal error (closing the socket)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wsreader::{DisconnectToken, Message, MessageReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let socket = Arc::new(connect().await?);
//!     let cancel = DisconnectToken::new();
//!
//!     let mut reader = MessageReader::builder()
//!         .buffer_size(4096)
//!         .max_message_size(64 * 1024)
//!         .spawn(socket, cancel.clone())?;
//!
//!     while let Some(message) = reader.recv().await {
//!         if message.is_close() {
//!             break;
//!         }
//!         println!("{:?}", message);
//!     }
//!
//!     reader.join().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, WsReaderError};
use crate::protocol::Message;
use crate::reader::read_message;
use crate::socket::{DisconnectToken, WebSocket};

/// Default receive buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default capacity of the message channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for the read loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Initial buffer allocation for fragmented messages.
    pub buffer_size: usize,
    /// Maximum reassembled message size (unbounded if `None`).
    pub max_message_size: Option<usize>,
    /// Messages buffered between the read loop and the consumer.
    pub channel_capacity: usize,
}

impl ReaderConfig {
    /// Parse a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReaderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size is positive.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(WsReaderError::InvalidConfig(
                "buffer_size must be positive".into(),
            ));
        }
        if self.max_message_size == Some(0) {
            return Err(WsReaderError::InvalidConfig(
                "max_message_size must be positive".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(WsReaderError::InvalidConfig(
                "channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Builder for configuring and spawning a message reader.
pub struct MessageReaderBuilder {
    config: ReaderConfig,
}

impl MessageReaderBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Set the receive buffer size.
    ///
    /// Default: 4096
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Set the maximum reassembled message size.
    ///
    /// Default: unbounded
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = Some(size);
        self
    }

    /// Set the message channel capacity.
    ///
    /// Default: 64
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Validate the configuration and spawn the read loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(self, socket: Arc<S>, cancel: DisconnectToken) -> Result<MessageReader>
    where
        S: WebSocket + 'static,
    {
        MessageReader::spawn(socket, self.config, cancel)
    }
}

impl Default for MessageReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running read loop.
///
/// Use `recv()` to take reassembled messages and `join()` to collect the
/// loop's outcome once it stops.
pub struct MessageReader {
    /// Reassembled messages.
    rx: mpsc::Receiver<Message>,
    /// Read loop task handle.
    task: JoinHandle<Result<()>>,
    /// Token that stops the loop.
    cancel: DisconnectToken,
}

impl MessageReader {
    /// Create a new reader builder.
    pub fn builder() -> MessageReaderBuilder {
        MessageReaderBuilder::new()
    }

    fn spawn<S>(socket: Arc<S>, config: ReaderConfig, cancel: DisconnectToken) -> Result<Self>
    where
        S: WebSocket + 'static,
    {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let task = tokio::spawn(Self::read_loop(socket, config, tx, cancel.clone()));

        Ok(MessageReader { rx, task, cancel })
    }

    /// Main read loop - reads messages and forwards them to the channel.
    async fn read_loop<S>(
        socket: Arc<S>,
        config: ReaderConfig,
        tx: mpsc::Sender<Message>,
        cancel: DisconnectToken,
    ) -> Result<()>
    where
        S: WebSocket + 'static,
    {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!("Read loop cancelled");
                return Ok(());
            }

            let message = match read_message(
                socket.as_ref(),
                config.buffer_size,
                config.max_message_size,
                &cancel,
            )
            .await
            {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(WsReaderError::ConnectionClosed) => {
                    tracing::debug!("Socket closed, stopping read loop");
                    return Err(WsReaderError::ConnectionClosed);
                }
                Err(e) => {
                    tracing::error!("Read loop error: {}", e);
                    let code = e.close_code();
                    if let Err(close_err) = socket.close(code, &e.to_string()).await {
                        tracing::warn!("Failed to close socket with {}: {}", code, close_err);
                    }
                    return Err(e);
                }
            };

            let is_close = message.is_close();
            if tx.send(message).await.is_err() {
                tracing::debug!("Message receiver dropped, stopping read loop");
                return Ok(());
            }

            if is_close {
                tracing::debug!("Close received, stopping read loop");
                return Ok(());
            }
        }
    }

    /// Receive the next message.
    ///
    /// Returns `None` once the loop has stopped and all messages are taken.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Stop the read loop at the next frame boundary.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait for the read loop to finish and return its outcome.
    pub async fn join(self) -> Result<()> {
        drop(self.rx);
        self.task.await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Frame, Opcode};
    use crate::socket::CloseCode;
    use crate::testing::ScriptedSocket;

    #[test]
    fn test_builder_default() {
        let builder = MessageReaderBuilder::default();
        assert_eq!(builder.config, ReaderConfig::default());
    }

    #[test]
    fn test_builder_configuration() {
        let builder = MessageReader::builder()
            .buffer_size(8192)
            .max_message_size(1024 * 1024)
            .channel_capacity(16);

        assert_eq!(builder.config.buffer_size, 8192);
        assert_eq!(builder.config.max_message_size, Some(1024 * 1024));
        assert_eq!(builder.config.channel_capacity, 16);
    }

    #[test]
    fn test_config_from_json() {
        let config = ReaderConfig::from_json(r#"{"max_message_size": 65536}"#).unwrap();

        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.max_message_size, Some(65536));
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_config_from_json_rejects_zero() {
        let result = ReaderConfig::from_json(r#"{"buffer_size": 0}"#);
        assert!(matches!(result, Err(WsReaderError::InvalidConfig(_))));

        let result = ReaderConfig::from_json("not json");
        assert!(matches!(result, Err(WsReaderError::Json(_))));
    }

    #[tokio::test]
    async fn test_huge_buffer_size_from_json() {
        let config =
            ReaderConfig::from_json(r#"{"buffer_size": 18446744073709551615}"#).unwrap();
        let socket = Arc::new(ScriptedSocket::new(vec![
            Frame::fragment(Opcode::Text, "a"),
            Frame::text("b"),
            Frame::close(),
        ]));

        let mut reader = MessageReaderBuilder::from_config(config)
            .spawn(socket, DisconnectToken::new())
            .unwrap();

        assert_eq!(reader.recv().await, Some(Message::Text("ab".into())));
        assert_eq!(reader.recv().await, Some(Message::CLOSE));
        reader.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_config() {
        let socket = Arc::new(ScriptedSocket::new(Vec::new()));
        let result = MessageReader::builder()
            .channel_capacity(0)
            .spawn(socket, DisconnectToken::new());

        assert!(matches!(result, Err(WsReaderError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_forwards_messages_until_close() {
        let socket = Arc::new(ScriptedSocket::new(vec![
            Frame::text("one"),
            Frame::fragment(Opcode::Binary, vec![1u8]),
            Frame::binary(vec![2u8]),
            Frame::close(),
            Frame::text("never read"),
        ]));

        let mut reader = MessageReader::builder()
            .spawn(socket.clone(), DisconnectToken::new())
            .unwrap();

        assert_eq!(reader.recv().await, Some(Message::Text("one".into())));
        assert_eq!(reader.recv().await.unwrap().as_bytes(), &[1u8, 2]);
        assert_eq!(reader.recv().await, Some(Message::CLOSE));
        assert_eq!(reader.recv().await, None);

        reader.join().await.unwrap();
        assert_eq!(socket.remaining(), 1);
    }

    #[tokio::test]
    async fn test_oversized_message_closes_socket() {
        let socket = Arc::new(ScriptedSocket::new(vec![
            Frame::fragment(Opcode::Text, "a".repeat(10)),
            Frame::text("b".repeat(10)),
        ]));

        let reader = MessageReader::builder()
            .max_message_size(16)
            .spawn(socket.clone(), DisconnectToken::new())
            .unwrap();

        let result = reader.join().await;
        assert!(matches!(result, Err(WsReaderError::MessageTooLarge { .. })));

        let closes = socket.closes();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].0, CloseCode::TooBig);
    }

    /// Scripted frames with a transport that cannot send the close frame.
    struct BrokenPipeSocket {
        inner: ScriptedSocket,
    }

    impl WebSocket for BrokenPipeSocket {
        fn subscribe(&self) -> crate::socket::FrameSubscription {
            self.inner.subscribe()
        }

        async fn close(&self, _code: CloseCode, _reason: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer gone").into())
        }
    }

    #[tokio::test]
    async fn test_failed_close_keeps_read_error() {
        let socket = Arc::new(BrokenPipeSocket {
            inner: ScriptedSocket::new(vec![
                Frame::fragment(Opcode::Text, "a"),
                Frame::binary(vec![1u8]),
            ]),
        });

        let reader = MessageReader::builder()
            .spawn(socket, DisconnectToken::new())
            .unwrap();

        let result = reader.join().await;
        assert!(matches!(
            result,
            Err(WsReaderError::UnexpectedMessageType { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop_without_error() {
        let socket = Arc::new(ScriptedSocket::new(Vec::new()));
        let reader = MessageReader::builder()
            .spawn(socket.clone(), DisconnectToken::new())
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(12)).await;
        reader.stop();

        reader.join().await.unwrap();
        assert!(socket.closes().is_empty());
    }
}
