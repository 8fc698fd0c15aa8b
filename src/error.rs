//! Error types for wsreader.

use thiserror::Error;

use crate::protocol::Opcode;
use crate::socket::CloseCode;

/// Main error type for all message reading operations.
#[derive(Debug, Error)]
pub enum WsReaderError {
    /// Reassembled message would exceed the configured maximum size.
    #[error("Message size {size} exceeds maximum {limit}")]
    MessageTooLarge { size: usize, limit: usize },

    /// A fragment changed type in the middle of a fragmented message.
    #[error("Incorrect message type: expected {expected}, got {actual}")]
    UnexpectedMessageType { expected: Opcode, actual: Opcode },

    /// Opcode that cannot start or finish a data message.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(Opcode),

    /// Text payload is not valid UTF-8.
    #[error("Invalid UTF-8 in text message: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// Reader configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reported by the socket.
    ///
    /// Not produced by the reader itself; [`WebSocket::close`] implementors
    /// return it when the transport fails to send the close frame.
    ///
    /// [`WebSocket::close`]: crate::socket::WebSocket::close
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Socket went away while a frame or close was pending.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Read loop task panicked or was aborted.
    #[error("Reader task failed: {0}")]
    ReaderTask(#[from] tokio::task::JoinError),
}

impl WsReaderError {
    /// Close code the transport sends when this error ends a connection.
    pub fn close_code(&self) -> CloseCode {
        match self {
            WsReaderError::MessageTooLarge { .. } => CloseCode::TooBig,
            WsReaderError::UnexpectedMessageType { .. }
            | WsReaderError::UnknownMessageType(_) => CloseCode::ProtocolError,
            WsReaderError::InvalidEncoding(_) => CloseCode::InvalidData,
            WsReaderError::ConnectionClosed => CloseCode::Away,
            WsReaderError::InvalidConfig(_)
            | WsReaderError::Json(_)
            | WsReaderError::Io(_)
            | WsReaderError::ReaderTask(_) => CloseCode::ServerError,
        }
    }

    /// Whether the error is a protocol violation by the remote peer.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            WsReaderError::MessageTooLarge { .. }
                | WsReaderError::UnexpectedMessageType { .. }
                | WsReaderError::UnknownMessageType(_)
                | WsReaderError::InvalidEncoding(_)
        )
    }
}

/// Result type alias using WsReaderError.
pub type Result<T> = std::result::Result<T, WsReaderError>;
