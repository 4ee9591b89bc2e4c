//! Agent configuration document
//!
//! ```json
//! {
//!   "filter":    { "type": "package", "version": "1.0", "config": ["acme"] },
//!   "generator": { "type": "println", "version": "1.0", "config": "err" },
//!   "logging":   "FINE"
//! }
//! ```

use crate::error::{ConfigError, PluginCategory};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File looked up when the agent argument names a directory
pub const DEFAULT_CONFIG_FILE_NAME: &str = "instrumenter-config.json";

const TYPE_KEY: &str = "type";
const VERSION_KEY: &str = "version";
const CONFIG_KEY: &str = "config";

/// Parsed agent configuration
///
/// Sections are kept as raw JSON so each consumer can diagnose its own
/// section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Selection policy section
    #[serde(default)]
    pub filter: Option<Value>,

    /// Trace generator section
    #[serde(default)]
    pub generator: Option<Value>,

    /// Logging level
    #[serde(default)]
    pub logging: Option<Value>,
}

impl AgentConfig {
    /// Configuration file named by the agent argument
    ///
    /// The argument is trimmed; a directory stands for its
    /// [`DEFAULT_CONFIG_FILE_NAME`].
    #[must_use]
    pub fn locate(args: &str) -> PathBuf {
        let path = PathBuf::from(args.trim());
        if path.is_dir() {
            path.join(DEFAULT_CONFIG_FILE_NAME)
        } else {
            path
        }
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file is missing, unreadable or not a
    /// JSON object
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let document: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::syntax_error(path, e))?;
        if !document.is_object() {
            return Err(ConfigError::NotAnObject(path.to_path_buf()));
        }
        serde_json::from_value(document).map_err(|e| ConfigError::syntax_error(path, e))
    }

    /// Section of a plugin category
    #[must_use]
    pub fn section(&self, category: PluginCategory) -> Option<&Value> {
        match category {
            PluginCategory::Filter => self.filter.as_ref(),
            PluginCategory::Generator => self.generator.as_ref(),
        }
    }
}

/// Validated plugin section: `type`, `version` and the opaque `config`
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSection<'a> {
    /// Requested plugin type
    pub plugin_type: String,
    /// Requested plugin version
    pub version: String,
    /// Plugin configuration, passed through unchanged
    pub config: Option<&'a Value>,
}

impl<'a> PluginSection<'a> {
    /// Validate a section value
    ///
    /// `type` and `version` must be JSON primitives; numbers and booleans are
    /// taken as their text.
    ///
    /// # Errors
    /// Returns [`ConfigError::MalformedSection`] if the section is not an
    /// object or `type`/`version` are missing or not primitives
    pub fn from_value(category: PluginCategory, value: &'a Value) -> Result<Self, ConfigError> {
        let Value::Object(section) = value else {
            return Err(ConfigError::malformed(category, "expected an object"));
        };
        let field = |key: &str| {
            section
                .get(key)
                .and_then(primitive_text)
                .ok_or_else(|| ConfigError::malformed(category, format!("`{key}` must be a string")))
        };
        Ok(Self {
            plugin_type: field(TYPE_KEY)?,
            version: field(VERSION_KEY)?,
            config: section.get(CONFIG_KEY),
        })
    }
}

fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
