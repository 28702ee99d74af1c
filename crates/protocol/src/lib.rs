//! Recon Protocol - Wire codec and message types for the recon server
//!
//! This crate provides the types that flow between a scanner client and
//! the reconstruction server:
//! - `MessageId` - the closed set of control message identifiers
//! - `codec` - primitive readers/writers over the byte stream
//! - `Message` - type-erased decoded payload flowing through channels
//! - `AcquisitionHeader` - deserialized scan/equipment description
//!
//! # Wire format
//!
//! Every message starts with a little-endian `u16` id. Control bodies
//! are either empty, a fixed 1024-byte NUL-terminated filename field,
//! or a `u32` length prefix followed by that many bytes of text:
//!
//! ```text
//! [2 bytes: id (LE)][body, format determined by id]
//! ```
//!
//! Data-message ids are assigned per configured reader; their body
//! format is owned by the reader plugin.

mod codec;
mod error;
mod header;
mod message;

pub use codec::{
    read_blob, read_filename, read_message_id, read_text_blob, read_u16, read_u32, write_blob,
    write_filename, write_text_blob, write_u16,
};
pub use error::ProtocolError;
pub use header::{AcquisitionHeader, EncodingSpace, HeaderError, SystemInfo};
pub use message::{Message, MessageId};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Size of the fixed filename field carried by FILENAME messages
pub const FILENAME_FIELD_SIZE: usize = 1024;

/// Maximum accepted length-prefixed blob size (16MB)
pub const MAX_BLOB_SIZE: u32 = 16 * 1024 * 1024;

// Test modules - only compiled during testing
#[cfg(test)]
mod codec_test;
#[cfg(test)]
mod header_test;
