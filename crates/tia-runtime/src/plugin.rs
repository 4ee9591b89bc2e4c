//! Typed plugin contract shared by selection policies and trace generators

use std::path::PathBuf;

/// Version every built-in plugin reports
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0";

/// A plugin factory identified by a `(type, version)` pair
///
/// The agent configuration names one factory per plugin category by this
/// pair; a factory is selected only on an exact match of both.
pub trait TypedFactory: Send + Sync {
    /// Plugin type name (`package`, `println`, ...)
    fn plugin_type(&self) -> &str;

    /// Plugin version
    fn plugin_version(&self) -> &str {
        DEFAULT_PLUGIN_VERSION
    }

    /// Check if this factory is the one requested
    fn matches(&self, plugin_type: &str, version: &str) -> bool {
        self.plugin_type() == plugin_type && self.plugin_version() == version
    }
}

/// Errors creating a plugin from its `config` value
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin requires a `config` value and none was given
    #[error("{plugin}: no configuration given")]
    MissingConfig {
        /// Plugin type
        plugin: String,
    },

    /// `config` value has the wrong shape
    #[error("{plugin}: invalid configuration: {reason}")]
    InvalidConfig {
        /// Plugin type
        plugin: String,
        /// What is wrong
        reason: String,
    },

    /// A configured file or directory does not exist
    #[error("{plugin}: resource not found: {}", path.display())]
    MissingResource {
        /// Plugin type
        plugin: String,
        /// Resolved path
        path: PathBuf,
    },
}

impl PluginError {
    /// Create missing-config error
    pub fn missing_config(plugin: impl Into<String>) -> Self {
        Self::MissingConfig {
            plugin: plugin.into(),
        }
    }

    /// Create invalid-config error
    pub fn invalid_config(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Create missing-resource error
    pub fn missing_resource(plugin: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingResource {
            plugin: plugin.into(),
            path: path.into(),
        }
    }
}
