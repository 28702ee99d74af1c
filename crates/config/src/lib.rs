//! Recon Configuration
//!
//! The configuration a client sends (inline or by filename) before any
//! data flows: which reader decodes each data-message id, which writers
//! serialize results, and the stage graph the reconstruction runs.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use recon_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(
//!     "<configuration><reader port=\"1008\" class=\"AcquisitionReader\"/></configuration>",
//! )
//! .unwrap();
//! assert_eq!(config.readers.len(), 1);
//! ```
//!
//! Parsing validates: explicit reader/writer ports must not collide
//! with the reserved control ids (1..=6) or with each other. Both are
//! configuration errors surfaced before any pipeline is built.

mod error;
mod paths;
mod validation;
mod xml;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use paths::Paths;

/// A reader or writer plugin reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    /// Library name carried by the configuration; kept for diagnostics
    /// and registry namespacing
    pub dll: String,

    /// Registered class name of the plugin
    pub classname: String,

    /// Explicit data-message id; plugins supply a default when unset
    pub port: Option<u16>,
}

/// One stage of the reconstruction stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GadgetConfig {
    pub name: String,
    pub dll: String,
    pub classname: String,
    /// Stage parameters, in document order
    pub properties: Vec<(String, String)>,
}

/// The processing-stream description (stage graph)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    pub gadgets: Vec<GadgetConfig>,
}

/// Parsed reconstruction configuration
///
/// Produced exactly once per connection, by exactly one of the two
/// config-producing control messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub readers: Vec<PluginConfig>,
    pub writers: Vec<PluginConfig>,
    pub stream: StreamConfig,
}

impl Config {
    /// Load a configuration from a file (the FILENAME control message)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse a configuration from its XML text
    fn parse(text: &str) -> Result<Self> {
        let config = xml::parse(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Encode the configuration in its canonical XML form
    ///
    /// Decoding the result yields an equivalent configuration.
    pub fn to_xml(&self) -> String {
        xml::encode(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
