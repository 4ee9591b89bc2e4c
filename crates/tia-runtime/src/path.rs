//! Resolution of filesystem-relative plugin configuration values

use std::path::{Path, PathBuf};

/// Resolves paths named in plugin configuration
///
/// Relative paths are taken relative to the directory of the agent
/// configuration file. Results are canonicalized when the file system allows
/// it, and returned as-is otherwise.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    config_file: Option<PathBuf>,
}

impl PathResolver {
    /// Resolver anchored at the given configuration file
    #[inline]
    #[must_use]
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(config_file.into()),
        }
    }

    /// Resolver with no configuration file (relative paths stay relative)
    #[inline]
    #[must_use]
    pub fn unanchored() -> Self {
        Self { config_file: None }
    }

    /// Configuration file this resolver is anchored at
    #[inline]
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Resolve a configured path
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return canonical_or_given(path.to_path_buf());
        }
        match self.config_file.as_deref().and_then(Path::parent) {
            Some(parent) if parent.is_dir() => canonical_or_given(parent.join(path)),
            _ => path.to_path_buf(),
        }
    }
}

fn canonical_or_given(path: PathBuf) -> PathBuf {
    path.canonicalize().unwrap_or(path)
}
