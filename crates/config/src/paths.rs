//! Run-time path layout for the reconstruction server

use std::path::{Component, Path, PathBuf};

use crate::{ConfigError, Result};

/// Well-known directories under the server's home directory
#[derive(Debug, Clone)]
pub struct Paths {
    home: PathBuf,
}

impl Paths {
    /// Create a path layout rooted at `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The server home directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory FILENAME-relative configuration files resolve under
    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    /// Resolve a FILENAME message path under the config directory
    ///
    /// Absolute paths and paths containing `..` are rejected; a client
    /// must not be able to read files outside the config directory.
    pub fn resolve_config(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);

        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));

        if escapes {
            return Err(ConfigError::InvalidPath {
                path: name.to_owned(),
            });
        }

        Ok(self.config_dir().join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_name() {
        let paths = Paths::new("/opt/recon");
        let resolved = paths.resolve_config("default.xml").unwrap();
        assert_eq!(resolved, PathBuf::from("/opt/recon/config/default.xml"));
    }

    #[test]
    fn test_resolve_nested_name() {
        let paths = Paths::new("/opt/recon");
        let resolved = paths.resolve_config("cartesian/grappa.xml").unwrap();
        assert_eq!(
            resolved,
            PathBuf::from("/opt/recon/config/cartesian/grappa.xml")
        );
    }

    #[test]
    fn test_reject_parent_traversal() {
        let paths = Paths::new("/opt/recon");
        let err = paths.resolve_config("../secrets.xml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn test_reject_absolute_path() {
        let paths = Paths::new("/opt/recon");
        let err = paths.resolve_config("/etc/passwd").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }
}
