//! Connection and server error types
//!
//! Every connection-level error is fatal to that connection and only
//! that connection: the input loop stops, the cancellation token fires,
//! and the tasks are joined. Nothing is retried.

use recon_config::ConfigError;
use recon_pipeline::{BuildError, ChannelClosed};
use recon_protocol::{HeaderError, ProtocolError};
use recon_registry::RegistryError;
use thiserror::Error;

/// Fatal per-connection errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("header rejected: {0}")]
    Header(#[from] HeaderError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("pipeline construction failed: {0}")]
    Build(#[from] BuildError),

    #[error("received a second configuration message")]
    DuplicateConfig,

    #[error("received a second header message")]
    DuplicateHeader,

    #[error("no writer serves outbound message id {id}")]
    NoWriterForMessage { id: u16 },

    #[error("pipeline channel closed: {0}")]
    Channel(#[from] ChannelClosed),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConnectionError {
    /// True for errors that mean the peer went away rather than
    /// misbehaved; the accept loop logs these at debug, not warn
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Protocol(e) => e.is_disconnect(),
            Self::Registry(e) => e.is_disconnect(),
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

/// Errors from the listening server itself
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
