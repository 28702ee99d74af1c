//! Registry error types

use recon_protocol::ProtocolError;
use thiserror::Error;

/// Result type for registry and plugin operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from plugin resolution and plugin codecs
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No reader registered under this class name
    #[error("no reader '{classname}' registered (library '{dll}')")]
    UnknownReader { dll: String, classname: String },

    /// No writer registered under this class name
    #[error("no writer '{classname}' registered (library '{dll}')")]
    UnknownWriter { dll: String, classname: String },

    /// A writer was handed a message type it does not serialize
    #[error("writer '{writer}' cannot serialize message id {id}")]
    UnsupportedMessage { writer: &'static str, id: u16 },

    /// Wire-level failure while decoding a message body
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl RegistryError {
    /// True if this error means the peer went away mid-message
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_disconnect())
    }
}
