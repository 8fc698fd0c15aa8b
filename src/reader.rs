//! Message reassembly.
//!
//! [`read_message`] turns frames from a [`WebSocket`] into complete
//! messages. Single-frame messages are returned straight from the frame
//! payload (fast path). Fragmented messages are coalesced in a
//! [`ByteBuffer`] bounded by the maximum message size (slow path).
//!
//! # Example
//!
//! ```ignore
//! use wsreader::{read_message, DisconnectToken, Message};
//!
//! let cancel = DisconnectToken::new();
//! loop {
//!     match read_message(&socket, 4096, Some(64 * 1024), &cancel).await? {
//!         Some(Message::Close) => break,
//!         Some(message) => handle(message),
//!         None if cancel.is_cancelled() => break,
//!         None => continue,
//!     }
//! }
//! ```

use crate::error::{Result, WsReaderError};
use crate::protocol::{ByteBuffer, Frame, Message, Opcode};
use crate::socket::{receive_frame, DisconnectToken, WebSocket};

/// Outcome of classifying a single frame.
#[derive(Debug)]
enum Classified {
    /// The frame is a whole message by itself.
    Complete(Message),
    /// The frame opens a fragmented message.
    Fragment(Frame),
    /// A continuation with no message start seen on this call.
    Orphan(Frame),
}

/// Read one complete message from the socket.
///
/// `buffer_size` sizes the fragment buffer's initial allocation and must be
/// positive. `max_message_size`, when set, caps the reassembled size.
///
/// Returns `Ok(None)` when a receive times out or `cancel` fires before a
/// message is complete; any partially collected fragments are discarded.
///
/// # Errors
///
/// - `MessageTooLarge` if the fragments exceed `max_message_size`
/// - `UnexpectedMessageType` if a fragment switches between text and binary
/// - `UnknownMessageType` for frames that cannot form a data message
/// - `InvalidEncoding` for text that is not valid UTF-8
/// - `ConnectionClosed` if the socket stops delivering frames
pub async fn read_message<S>(
    socket: &S,
    buffer_size: usize,
    max_message_size: Option<usize>,
    cancel: &DisconnectToken,
) -> Result<Option<Message>>
where
    S: WebSocket + ?Sized,
{
    validate_sizes(buffer_size, max_message_size)?;

    // First receive without a buffer: most messages are a single frame.
    let Some(frame) = receive_frame(socket, cancel).await? else {
        return Ok(None);
    };

    let first = match classify(frame, false)? {
        Classified::Complete(message) => return Ok(Some(message)),
        Classified::Fragment(frame) => frame,
        Classified::Orphan(frame) => {
            tracing::debug!(
                "Skipping continuation frame ({} bytes) without message start",
                frame.payload_len()
            );

            let Some(frame) = receive_frame(socket, cancel).await? else {
                return Ok(None);
            };
            match classify(frame, true)? {
                Classified::Complete(message) => return Ok(Some(message)),
                Classified::Fragment(frame) | Classified::Orphan(frame) => frame,
            }
        }
    };

    read_fragments(socket, first, buffer_size, max_message_size, cancel).await
}

/// Classify a frame as a complete message or the start of a fragmented one.
///
/// Without a buffer, empty data frames map to the canonical empty messages.
fn classify(frame: Frame, buffered: bool) -> Result<Classified> {
    match frame.opcode {
        Opcode::Close => Ok(Classified::Complete(Message::CLOSE)),
        Opcode::Continuation => Ok(Classified::Orphan(frame)),
        Opcode::Text | Opcode::Binary if !frame.fin => Ok(Classified::Fragment(frame)),
        Opcode::Text if !buffered && frame.payload.is_empty() => {
            Ok(Classified::Complete(Message::EMPTY_TEXT))
        }
        Opcode::Binary if !buffered && frame.payload.is_empty() => {
            Ok(Classified::Complete(Message::EMPTY_BINARY))
        }
        Opcode::Text => {
            let text = std::str::from_utf8(&frame.payload)?;
            Ok(Classified::Complete(Message::Text(text.to_owned())))
        }
        Opcode::Binary => Ok(Classified::Complete(Message::Binary(frame.payload))),
        opcode @ (Opcode::Ping | Opcode::Pong) => Err(WsReaderError::UnknownMessageType(opcode)),
    }
}

/// Coalesce a fragmented message starting with `first`.
async fn read_fragments<S>(
    socket: &S,
    first: Frame,
    buffer_size: usize,
    max_message_size: Option<usize>,
    cancel: &DisconnectToken,
) -> Result<Option<Message>>
where
    S: WebSocket + ?Sized,
{
    let mut buffer = ByteBuffer::with_capacity(buffer_size, max_message_size);
    buffer.append(first.payload())?;

    // Every later fragment must be a continuation or match this type.
    let original_type = first.opcode;
    let mut fragments = 1usize;

    loop {
        let frame = match receive_frame(socket, cancel).await? {
            Some(frame) => frame,
            None if cancel.is_cancelled() => {
                tracing::debug!(
                    "Cancelled after {} fragments, discarding {} bytes",
                    fragments,
                    buffer.len()
                );
                return Ok(None);
            }
            None => continue,
        };

        if frame.opcode == Opcode::Close {
            tracing::debug!(
                "Close received mid-message, discarding {} bytes",
                buffer.len()
            );
            return Ok(Some(Message::CLOSE));
        }

        if frame.opcode != original_type && frame.opcode != Opcode::Continuation {
            return Err(WsReaderError::UnexpectedMessageType {
                expected: original_type,
                actual: frame.opcode,
            });
        }

        buffer.append(frame.payload())?;
        fragments += 1;

        if frame.opcode == Opcode::Continuation && !frame.fin {
            continue;
        }

        tracing::trace!(
            "Reassembled {} message from {} fragments ({} bytes)",
            original_type,
            fragments,
            buffer.len()
        );

        return match original_type {
            Opcode::Binary => Ok(Some(Message::Binary(buffer.into_bytes()))),
            Opcode::Text => Ok(Some(Message::Text(buffer.into_text()?))),
            other => Err(WsReaderError::UnknownMessageType(other)),
        };
    }
}

fn validate_sizes(buffer_size: usize, max_message_size: Option<usize>) -> Result<()> {
    if buffer_size == 0 {
        return Err(WsReaderError::InvalidConfig(
            "buffer_size must be positive".into(),
        ));
    }
    if max_message_size == Some(0) {
        return Err(WsReaderError::InvalidConfig(
            "max_message_size must be positive".into(),
        ));
    }
    Ok(())
}
