//! Recon Pipeline - coordination primitives and pipeline construction
//!
//! The pieces a connection uses to turn a configuration and header into
//! a running pipeline:
//! - `OneShot` - single-assignment cell; set exactly once, any number
//!   of readers, reading before the value exists awaits it
//! - `MessageChannel` - unbounded FIFO queue of decoded messages
//! - `DispatchTable` - thread-safe id-to-handler registry with atomic
//!   lookup and merge
//! - `build_pipeline` - the background task that awaits the config and
//!   header one-shots and resolves the reader/writer tables and the
//!   stage graph
//!
//! # Ordering
//!
//! The config and header one-shots complete in whatever order the
//! client sends them; `build_pipeline` awaits them independently and
//! produces identical results either way. The reader table is resolved
//! from the configuration alone so data messages can be decoded before
//! the header arrives.

mod builder;
mod channel;
mod context;
mod dispatch;
mod error;
mod oneshot;

pub use builder::{build_pipeline, PipelinePromises, ReaderTable, WriterTable};
pub use channel::{message_channel, MessageReceiver, MessageSender};
pub use context::{Context, ReconStream, Stage};
pub use dispatch::DispatchTable;
pub use error::{BuildError, ChannelClosed, OneShotError};
pub use oneshot::OneShot;

/// Result type for pipeline construction
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod channel_test;
#[cfg(test)]
mod dispatch_test;
#[cfg(test)]
mod oneshot_test;
