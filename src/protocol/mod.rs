//! Protocol module - frames, messages, and fragment buffering.
//!
//! This module holds the data types the reader works with:
//! - Opcodes and frames as delivered by the socket
//! - Reassembled messages with canonical empty values
//! - Bounded byte buffer for coalescing fragments

mod byte_buffer;
mod frame;
mod message;
mod opcode;

pub use byte_buffer::ByteBuffer;
pub use frame::Frame;
pub use message::{Message, MessageType};
pub use opcode::Opcode;
