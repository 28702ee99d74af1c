//! Name-keyed plugin registry

use std::collections::HashMap;
use std::sync::Arc;

use crate::plugins::{AcquisitionReader, ImageWriter, WaveformReader};
use crate::{Reader, RegistryError, Result, Writer};

type ReaderFactory = Box<dyn Fn() -> Arc<dyn Reader> + Send + Sync>;
type WriterFactory = Box<dyn Fn() -> Arc<dyn Writer> + Send + Sync>;

/// Maps plugin class names to factories
///
/// Populated at process start; shared read-only across connections.
/// The library name from the configuration is kept for diagnostics
/// only - resolution is by class name.
#[derive(Default)]
pub struct Registry {
    readers: HashMap<String, ReaderFactory>,
    writers: HashMap<String, WriterFactory>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in plugins
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_reader("AcquisitionReader", || Arc::new(AcquisitionReader));
        registry.register_reader("WaveformReader", || Arc::new(WaveformReader));
        registry.register_writer("ImageWriter", || Arc::new(ImageWriter));
        registry
    }

    /// Register a reader factory under a class name
    pub fn register_reader<F>(&mut self, classname: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Reader> + Send + Sync + 'static,
    {
        self.readers.insert(classname.into(), Box::new(factory));
    }

    /// Register a writer factory under a class name
    pub fn register_writer<F>(&mut self, classname: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Writer> + Send + Sync + 'static,
    {
        self.writers.insert(classname.into(), Box::new(factory));
    }

    /// Instantiate the reader registered under `classname`
    pub fn load_reader(&self, dll: &str, classname: &str) -> Result<Arc<dyn Reader>> {
        let factory = self
            .readers
            .get(classname)
            .ok_or_else(|| RegistryError::UnknownReader {
                dll: dll.to_owned(),
                classname: classname.to_owned(),
            })?;
        Ok(factory())
    }

    /// Instantiate the writer registered under `classname`
    pub fn load_writer(&self, dll: &str, classname: &str) -> Result<Arc<dyn Writer>> {
        let factory = self
            .writers
            .get(classname)
            .ok_or_else(|| RegistryError::UnknownWriter {
                dll: dll.to_owned(),
                classname: classname.to_owned(),
            })?;
        Ok(factory())
    }

    /// Names of all registered readers (diagnostics)
    pub fn reader_names(&self) -> Vec<&str> {
        self.readers.keys().map(String::as_str).collect()
    }

    /// Names of all registered writers (diagnostics)
    pub fn writer_names(&self) -> Vec<&str> {
        self.writers.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("readers", &self.readers.len())
            .field("writers", &self.writers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{ACQUISITION_SLOT, IMAGE_SLOT};

    #[test]
    fn test_builtin_plugins_resolve() {
        let registry = Registry::builtin();

        let reader = registry.load_reader("recon_mri", "AcquisitionReader").unwrap();
        assert_eq!(reader.slot(), ACQUISITION_SLOT);

        let writer = registry.load_writer("recon_mri", "ImageWriter").unwrap();
        assert_eq!(writer.slot(), IMAGE_SLOT);
    }

    #[test]
    fn test_unknown_reader_is_fatal() {
        let registry = Registry::builtin();
        let err = registry.load_reader("lib", "NoSuchReader").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnknownReader { ref classname, .. } if classname == "NoSuchReader"
        ));
    }

    #[test]
    fn test_unknown_writer_is_fatal() {
        let registry = Registry::builtin();
        let err = registry.load_writer("lib", "NoSuchWriter").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownWriter { .. }));
    }

    #[test]
    fn test_custom_registration_overrides() {
        let mut registry = Registry::new();
        registry.register_reader("AcquisitionReader", || Arc::new(AcquisitionReader));
        assert!(registry.load_reader("", "AcquisitionReader").is_ok());
        assert_eq!(registry.reader_names(), vec!["AcquisitionReader"]);
    }
}
