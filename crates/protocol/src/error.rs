//! Protocol error types

use thiserror::Error;

/// Errors that can occur while reading or writing wire messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Stream ended in the middle of a message
    #[error("truncated read: expected {expected} more bytes")]
    TruncatedRead {
        /// Bytes still required when the stream ended
        expected: usize,
    },

    /// Message id not present in the dispatch table, even after the
    /// reader table was merged
    #[error("unknown message id: {0}")]
    UnknownMessageId(u16),

    /// Length-prefixed blob exceeds the accepted maximum
    #[error("blob size {size} exceeds maximum {max}")]
    BlobTooLarge { size: u32, max: u32 },

    /// Text field is not valid UTF-8
    #[error("invalid string in {field} field")]
    InvalidString { field: &'static str },

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a truncated read error
    #[inline]
    pub fn truncated(expected: usize) -> Self {
        Self::TruncatedRead { expected }
    }

    /// True if this error means the peer went away mid-message
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::TruncatedRead { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
