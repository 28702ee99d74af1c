//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the referenced configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Malformed XML
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A required element or attribute is absent
    #[error("{component} is missing required '{element}'")]
    MissingElement {
        /// Component type ("reader", "writer", "gadget")
        component: &'static str,
        /// Missing element or attribute name
        element: &'static str,
    },

    /// An element holds a value of the wrong type
    #[error("config element '{element}' has invalid value '{value}'")]
    InvalidValue { element: String, value: String },

    /// Validation error - explicit port falls in the reserved control range
    #[error("{component} port {port} collides with a reserved control message id")]
    ReservedPort {
        component: &'static str,
        port: u16,
    },

    /// Validation error - two entries claim the same explicit port
    #[error("{component} port {port} is assigned more than once")]
    DuplicatePort {
        component: &'static str,
        port: u16,
    },

    /// FILENAME path escapes the configuration directory
    #[error("config filename '{path}' escapes the config directory")]
    InvalidPath {
        /// The offending relative path
        path: String,
    },
}

impl ConfigError {
    /// Create a MissingElement error
    pub fn missing(component: &'static str, element: &'static str) -> Self {
        Self::MissingElement { component, element }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(element: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.into(),
            value: value.into(),
        }
    }
}
