//! Bounded buffer for coalescing message fragments.
//!
//! Uses `bytes::BytesMut` so a finished binary message is frozen without
//! copying. The optional limit caps the total number of bytes the buffer
//! will ever hold; an append that would cross it fails before copying.
//!
//! # Example
//!
//! ```
//! use wsreader::protocol::ByteBuffer;
//!
//! let mut buffer = ByteBuffer::new(Some(16));
//! buffer.append(b"hello ").unwrap();
//! buffer.append(b"world").unwrap();
//!
//! assert_eq!(buffer.into_text().unwrap(), "hello world");
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::{Result, WsReaderError};

/// Largest allocation made up front; growth past it happens on append.
pub const MAX_INITIAL_CAPACITY: usize = 1024 * 1024;

/// Append-only byte buffer with an optional size limit.
///
/// Both accessors consume the buffer. After a failed `append` the buffer
/// must be abandoned together with the message it was collecting.
#[derive(Debug)]
pub struct ByteBuffer {
    /// Accumulated fragment bytes.
    buffer: BytesMut,
    /// Maximum total size, if any.
    limit: Option<usize>,
}

impl ByteBuffer {
    /// Create an empty buffer with the given limit.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            buffer: BytesMut::new(),
            limit,
        }
    }

    /// Create a buffer with preallocated capacity.
    ///
    /// Capacity is a hint, clamped to the limit and to
    /// [`MAX_INITIAL_CAPACITY`].
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Self {
        let capacity = match limit {
            Some(limit) => capacity.min(limit),
            None => capacity,
        }
        .min(MAX_INITIAL_CAPACITY);

        Self {
            buffer: BytesMut::with_capacity(capacity),
            limit,
        }
    }

    /// Append bytes to the buffer.
    ///
    /// # Errors
    ///
    /// Returns `MessageTooLarge` if the new length would exceed the limit.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if let Some(limit) = self.limit {
            let size = self.buffer.len().saturating_add(data.len());
            if size > limit {
                return Err(WsReaderError::MessageTooLarge { size, limit });
            }
        }

        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Consume the buffer as binary content (zero-copy freeze).
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Consume the buffer as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEncoding` if the content is not valid UTF-8.
    pub fn into_text(self) -> Result<String> {
        let text = std::str::from_utf8(&self.buffer)?;
        Ok(text.to_owned())
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the configured limit.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_into_bytes() {
        let mut buffer = ByteBuffer::new(None);
        buffer.append(b"first").unwrap();
        buffer.append(b"-").unwrap();
        buffer.append(b"second").unwrap();

        assert_eq!(buffer.len(), 12);
        assert_eq!(&buffer.into_bytes()[..], b"first-second");
    }

    #[test]
    fn test_into_text() {
        let mut buffer = ByteBuffer::new(Some(64));
        buffer.append("héllo ".as_bytes()).unwrap();
        buffer.append("wörld".as_bytes()).unwrap();

        assert_eq!(buffer.into_text().unwrap(), "héllo wörld");
    }

    #[test]
    fn test_text_split_inside_code_point() {
        // "é" is 0xC3 0xA9; split across two appends
        let mut buffer = ByteBuffer::new(None);
        buffer.append(&[b'c', b'a', b'f', 0xC3]).unwrap();
        buffer.append(&[0xA9]).unwrap();

        assert_eq!(buffer.into_text().unwrap(), "café");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut buffer = ByteBuffer::new(None);
        buffer.append(&[0x66, 0x6F, 0xFF, 0x6F]).unwrap();

        let result = buffer.into_text();
        assert!(matches!(result, Err(WsReaderError::InvalidEncoding(_))));
    }

    #[test]
    fn test_limit_exactly_reached() {
        let mut buffer = ByteBuffer::new(Some(10));
        buffer.append(&[0u8; 4]).unwrap();
        buffer.append(&[0u8; 6]).unwrap();

        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn test_limit_exceeded() {
        let mut buffer = ByteBuffer::new(Some(10));
        buffer.append(&[0u8; 8]).unwrap();

        let result = buffer.append(&[0u8; 3]);
        match result {
            Err(WsReaderError::MessageTooLarge { size, limit }) => {
                assert_eq!(size, 11);
                assert_eq!(limit, 10);
            }
            other => panic!("expected MessageTooLarge, got {:?}", other),
        }
        // Nothing past the limit was buffered
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn test_single_oversized_append() {
        let mut buffer = ByteBuffer::new(Some(100));
        let result = buffer.append(&vec![0xAB; 1024]);

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_clamped_to_limit() {
        let buffer = ByteBuffer::with_capacity(64 * 1024, Some(16));
        assert_eq!(buffer.limit(), Some(16));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_huge_capacity_hint_without_limit() {
        let mut buffer = ByteBuffer::with_capacity(usize::MAX, None);
        buffer.append(b"a").unwrap();
        buffer.append(b"b").unwrap();

        assert_eq!(buffer.limit(), None);
        assert_eq!(buffer.into_text().unwrap(), "ab");
    }

    #[test]
    fn test_unbounded_large_payload() {
        let mut buffer = ByteBuffer::default();
        for _ in 0..16 {
            buffer.append(&vec![0xCD; 64 * 1024]).unwrap();
        }

        let bytes = buffer.into_bytes();
        assert_eq!(bytes.len(), 1024 * 1024);
        assert!(bytes.iter().all(|&b| b == 0xCD));
    }

    #[test]
    fn test_empty_buffer_materializes_empty() {
        assert!(ByteBuffer::new(Some(1)).into_bytes().is_empty());
        assert_eq!(ByteBuffer::new(None).into_text().unwrap(), "");
    }
}
