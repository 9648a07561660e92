//! Error types for protocol decoding.

use std::error::Error;
use std::fmt;

/// A frame could not be decoded into a [`Message`](crate::Message).
///
/// Non-fatal by contract: receivers log the error and discard the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The tag code is not part of the protocol.
    UnknownTag {
        /// The unrecognised tag code.
        tag: i32,
    },
    /// The payload length does not match the tag.
    BadPayload {
        /// The frame's tag code.
        tag: i32,
        /// Payload length the tag requires.
        expected: usize,
        /// Payload length received.
        got: usize,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(f, "unknown message tag {tag}"),
            Self::BadPayload { tag, expected, got } => {
                write!(
                    f,
                    "tag {tag} expects {expected} payload value(s), got {got}"
                )
            }
        }
    }
}

impl Error for ProtocolError {}
