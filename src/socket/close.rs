//! Close status codes (RFC 6455, section 7.4.1).

use std::fmt;

/// Status code sent with a close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// 1000: normal closure.
    Normal,
    /// 1001: endpoint going away.
    Away,
    /// 1002: protocol error.
    ProtocolError,
    /// 1003: data type cannot be accepted.
    UnsupportedData,
    /// 1007: payload inconsistent with the message type.
    InvalidData,
    /// 1008: policy violation.
    PolicyViolation,
    /// 1009: message too big to process.
    TooBig,
    /// 1011: unexpected condition on the server.
    ServerError,
}

impl CloseCode {
    /// Numeric status code.
    pub fn as_u16(self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::Away => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::InvalidData => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::TooBig => 1009,
            CloseCode::ServerError => 1011,
        }
    }

    /// Parse a numeric status code. Unsupported values return `None`.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(CloseCode::Normal),
            1001 => Some(CloseCode::Away),
            1002 => Some(CloseCode::ProtocolError),
            1003 => Some(CloseCode::UnsupportedData),
            1007 => Some(CloseCode::InvalidData),
            1008 => Some(CloseCode::PolicyViolation),
            1009 => Some(CloseCode::TooBig),
            1011 => Some(CloseCode::ServerError),
            _ => None,
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}
