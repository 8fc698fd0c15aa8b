//! # wsreader
//!
//! Size-bounded WebSocket message reassembly for real-time messaging
//! clients.
//!
//! This crate sits between a WebSocket implementation that delivers raw
//! frames and a client that wants whole text or binary messages.
//!
//! ## Architecture
//!
//! - **Socket boundary**: frames arrive as events on a [`socket::FrameEvents`]
//!   hub; each receive races one subscription against a wait time and a
//!   [`DisconnectToken`]
//! - **Reassembly**: [`read_message`] returns single-frame messages directly
//!   and coalesces fragmented ones in a bounded [`protocol::ByteBuffer`]
//! - **Driver**: [`MessageReader`] runs the read loop on a task and closes the
//!   socket on protocol violations
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wsreader::{DisconnectToken, MessageReader};
//!
//! #[tokio::main]
//! async fn main() {
//!     let socket = Arc::new(my_socket().await);
//!     let mut reader = MessageReader::builder()
//!         .max_message_size(64 * 1024)
//!         .spawn(socket, DisconnectToken::new())
//!         .unwrap();
//!
//!     while let Some(message) = reader.recv().await {
//!         println!("{:?}", message);
//!     }
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod socket;
pub mod testing;

mod client;
mod reader;

pub use client::{
    MessageReader, MessageReaderBuilder, ReaderConfig, DEFAULT_BUFFER_SIZE,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use error::{Result, WsReaderError};
pub use protocol::{Message, MessageType};
pub use reader::read_message;
pub use socket::{CloseCode, DisconnectToken, WebSocket};
