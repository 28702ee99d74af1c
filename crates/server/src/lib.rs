//! Recon Server - the streaming reconstruction front door
//!
//! Accepts TCP clients speaking the length-prefixed message protocol,
//! multiplexes each byte stream into control and data messages, and
//! constructs a reconstruction pipeline per connection from the
//! client-supplied configuration and acquisition header.

pub mod connection;
pub mod error;
pub mod metrics;
pub mod server;

mod handlers;

pub use connection::Connection;
pub use error::{ConnectionError, ServerError};
pub use metrics::{ServerMetrics, ServerMetricsSnapshot};
pub use server::{Server, ServerConfig};
