//! Error types for table loading

use std::path::PathBuf;

/// Errors loading a symbol or reference table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Table file does not exist
    #[error("table file does not exist: {0}")]
    Missing(PathBuf),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Table file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Table file is not a valid table document
    #[error("unreadable table {path}: {source}")]
    Syntax {
        /// Table file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

impl TableError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for path
    pub fn syntax_error(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Syntax {
            path: path.into(),
            source,
        }
    }

    /// File the error relates to
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Missing(path) | Self::Io { path, .. } | Self::Syntax { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_display() {
        let err = TableError::Missing(PathBuf::from("/t/symTable.json"));
        assert_eq!(err.to_string(), "table file does not exist: /t/symTable.json");
        assert_eq!(err.path(), std::path::Path::new("/t/symTable.json"));
    }

    #[test]
    fn syntax_display() {
        let source = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = TableError::syntax_error("/t/refTable.json", source);
        assert!(err.to_string().starts_with("unreadable table /t/refTable.json"));
    }
}
