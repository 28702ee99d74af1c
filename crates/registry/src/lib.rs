//! Recon Registry - reader/writer plugins resolved by class name
//!
//! Configurations name readers and writers by class name (historically
//! a shared-library symbol). Those names resolve against an explicit
//! registry: factories are registered under a class name at process
//! start, and pipeline construction looks configuration entries up
//! against it. A missing entry is fatal to pipeline construction and
//! is never retried.

mod error;
mod plugins;
mod registry;

pub use error::{RegistryError, Result};
pub use plugins::{
    Acquisition, AcquisitionReader, Image, ImageWriter, Waveform, WaveformReader,
    ACQUISITION_SLOT, IMAGE_SLOT, WAVEFORM_SLOT,
};
pub use registry::Registry;

use std::any::Any;

use async_trait::async_trait;
use bytes::Bytes;
use recon_protocol::Message;
use tokio::io::AsyncRead;

/// The type-erased payload a reader produces
pub type Payload = Box<dyn Any + Send>;

/// A data-message decoder
///
/// One reader is instantiated per configured reader entry; its `read`
/// consumes exactly one message body from the stream each time the
/// input loop dispatches its id.
#[async_trait]
pub trait Reader: std::fmt::Debug + Send + Sync {
    /// The data-message id this reader serves when the configuration
    /// does not assign one explicitly
    fn slot(&self) -> u16;

    /// Decode one message body from the stream
    async fn read(&self, stream: &mut (dyn AsyncRead + Send + Unpin)) -> Result<Payload>;
}

/// A data-message serializer for the output loop
pub trait Writer: std::fmt::Debug + Send + Sync {
    /// The data-message id this writer serves when the configuration
    /// does not assign one explicitly
    fn slot(&self) -> u16;

    /// Serialize a message into its wire body (everything after the id)
    fn serialize(&self, message: &Message) -> Result<Bytes>;
}
