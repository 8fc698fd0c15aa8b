//! Reassembled messages handed to the caller.

use bytes::Bytes;

/// Kind of a reassembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Text,
    Binary,
    Close,
}

/// A complete logical message.
///
/// The empty and close cases have canonical constants
/// ([`Message::EMPTY_TEXT`], [`Message::EMPTY_BINARY`], [`Message::CLOSE`])
/// that compare equal to any other message with the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// UTF-8 text message.
    Text(String),
    /// Binary message.
    Binary(Bytes),
    /// The peer closed the connection.
    Close,
}

impl Message {
    /// Zero-length text message.
    pub const EMPTY_TEXT: Message = Message::Text(String::new());

    /// Zero-length binary message.
    pub const EMPTY_BINARY: Message = Message::Binary(Bytes::new());

    /// Close message.
    pub const CLOSE: Message = Message::Close;

    /// Get the message type.
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Text(_) => MessageType::Text,
            Message::Binary(_) => MessageType::Binary,
            Message::Close => MessageType::Close,
        }
    }

    /// Text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Raw content bytes. Close has none.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Message::Text(text) => text.as_bytes(),
            Message::Binary(bytes) => &bytes[..],
            Message::Close => &[],
        }
    }

    /// Content length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if the message carries no content.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is the close message.
    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self, Message::Close)
    }
}
