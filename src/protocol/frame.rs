//! Frame struct delivered by the socket.
//!
//! A frame is one receive event: an opcode, its payload and the FIN bit.
//! Uses `bytes::Bytes` so the payload can be handed to a message without
//! copying.
//!
//! # Example
//!
//! ```
//! use wsreader::protocol::{Frame, Opcode};
//!
//! let frame = Frame::fragment(Opcode::Text, "hel");
//!
//! assert_eq!(frame.opcode, Opcode::Text);
//! assert_eq!(frame.payload(), b"hel");
//! assert!(!frame.is_final());
//! ```

use bytes::Bytes;

use super::Opcode;

/// A single frame received from the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame opcode.
    pub opcode: Opcode,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
    /// FIN bit: last frame of its message.
    pub fin: bool,
}

impl Frame {
    /// Create a new frame.
    pub fn new(opcode: Opcode, payload: impl Into<Bytes>, fin: bool) -> Self {
        Self {
            opcode,
            payload: payload.into(),
            fin,
        }
    }

    /// Complete single-frame text message.
    pub fn text(payload: impl Into<String>) -> Self {
        Self::new(Opcode::Text, payload.into(), true)
    }

    /// Complete single-frame binary message.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(Opcode::Binary, payload, true)
    }

    /// Non-final frame of the given opcode.
    pub fn fragment(opcode: Opcode, payload: impl Into<Bytes>) -> Self {
        Self::new(opcode, payload, false)
    }

    /// Continuation frame.
    pub fn continuation(payload: impl Into<Bytes>, fin: bool) -> Self {
        Self::new(Opcode::Continuation, payload, fin)
    }

    /// Close frame with an empty payload.
    pub fn close() -> Self {
        Self::new(Opcode::Close, Bytes::new(), true)
    }

    /// Ping frame.
    pub fn ping(payload: impl Into<Bytes>) -> Self {
        Self::new(Opcode::Ping, payload, true)
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Check the FIN bit.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.fin
    }

    /// Check if this is a close frame.
    #[inline]
    pub fn is_close(&self) -> bool {
        self.opcode == Opcode::Close
    }

    /// Check if this is a continuation frame.
    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.opcode == Opcode::Continuation
    }
}
