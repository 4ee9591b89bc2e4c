//! Error types for TIA Core
//!
//! Configuration errors surface while the agent attaches; injection errors
//! surface while a single behavior is instrumented. Neither ever crosses the
//! host boundary: both are logged where they occur.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use tia_codegen::CodegenError;
use tia_runtime::{PluginError, RewriteError};

/// Plugin category a configuration section configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCategory {
    /// Selection policy (`filter` section)
    Filter,
    /// Trace generator (`generator` section)
    Generator,
}

impl PluginCategory {
    /// Section name in the configuration document
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Generator => "generator",
        }
    }
}

impl Display for PluginCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// Errors reading the agent configuration or creating its plugins
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("configuration file does not exist: {0}")]
    Missing(PathBuf),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON
    #[error("unreadable configuration {path}: {source}")]
    Syntax {
        /// Configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration document is not a JSON object
    #[error("configuration {0} is not a json object")]
    NotAnObject(PathBuf),

    /// Plugin section absent
    #[error("no {0} section")]
    MissingSection(PluginCategory),

    /// Plugin section present but unusable
    #[error("malformed {category} section: {reason}")]
    MalformedSection {
        /// Section category
        category: PluginCategory,
        /// What is wrong
        reason: String,
    },

    /// No registered factory matches the section's type and version
    #[error("no {category} plugin of type {plugin_type} version {version}")]
    UnknownPlugin {
        /// Section category
        category: PluginCategory,
        /// Requested type
        plugin_type: String,
        /// Requested version
        version: String,
    },

    /// Matched factory rejected its `config` value
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl ConfigError {
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

    /// Create malformed-section error
    pub fn malformed(category: PluginCategory, reason: impl Into<String>) -> Self {
        Self::MalformedSection {
            category,
            reason: reason.into(),
        }
    }
}

/// Errors instrumenting a single behavior
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// Generator could not render a snippet
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// Rewriter rejected a snippet
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::MissingSection(PluginCategory::Generator).to_string(),
            "no generator section"
        );
        assert_eq!(
            ConfigError::UnknownPlugin {
                category: PluginCategory::Filter,
                plugin_type: "regex".to_string(),
                version: "1.0".to_string(),
            }
            .to_string(),
            "no filter plugin of type regex version 1.0"
        );
        assert_eq!(
            ConfigError::from(PluginError::missing_config("package")).to_string(),
            "package: no configuration given"
        );
    }

    #[test]
    fn inject_error_is_transparent() {
        let err = InjectError::from(CodegenError::generator("boom"));
        assert_eq!(err.to_string(), "generator failed: boom");
    }
}
