//! Plugin factory registry
//!
//! Provides [`FactoryRegistry`], an explicit list of plugin factories per
//! category. A configuration section selects exactly one factory by its
//! `(type, version)` pair.

use crate::config::PluginSection;
use crate::error::{ConfigError, PluginCategory};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use tia_codegen::{TraceGenerator, TraceGeneratorFactory};
use tia_filter::{ApplicationProcessor, ApplicationProcessorFactory};
use tia_runtime::{PathResolver, TypedFactory};

/// `(type, version)` pair of a selected plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginId {
    /// Plugin type
    pub plugin_type: String,
    /// Plugin version
    pub version: String,
}

impl PluginId {
    /// Create plugin id
    pub fn new(plugin_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            version: version.into(),
        }
    }
}

impl Display for PluginId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.plugin_type, self.version)
    }
}

/// Registered factories of one plugin category
pub struct FactoryRegistry<F: ?Sized> {
    category: PluginCategory,
    factories: Vec<Box<F>>,
}

/// Registry of selection-policy factories
pub type FilterRegistry = FactoryRegistry<dyn ApplicationProcessorFactory>;

/// Registry of trace-generator factories
pub type GeneratorRegistry = FactoryRegistry<dyn TraceGeneratorFactory>;

impl<F: ?Sized + TypedFactory> fmt::Debug for FactoryRegistry<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("category", &self.category)
            .field("plugins", &self.plugin_ids())
            .finish()
    }
}

impl<F: ?Sized + TypedFactory> FactoryRegistry<F> {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new(category: PluginCategory) -> Self {
        Self {
            category,
            factories: Vec::new(),
        }
    }

    /// Register a factory
    ///
    /// Factories are consulted in registration order.
    pub fn register(&mut self, factory: Box<F>) {
        self.factories.push(factory);
    }

    /// Plugin category
    #[inline]
    #[must_use]
    pub fn category(&self) -> PluginCategory {
        self.category
    }

    /// Get number of registered factories
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Ids of all registered factories
    #[must_use]
    pub fn plugin_ids(&self) -> Vec<PluginId> {
        self.factories
            .iter()
            .map(|f| PluginId::new(f.plugin_type(), f.plugin_version()))
            .collect()
    }

    /// Factory with exactly this type and version
    #[must_use]
    pub fn find(&self, plugin_type: &str, version: &str) -> Option<&F> {
        self.factories
            .iter()
            .map(|f| &**f)
            .find(|f| f.matches(plugin_type, version))
    }

    /// Factory selected by a configuration section
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the section is absent or malformed, or if
    /// no factory matches it
    pub fn select<'v>(&self, section: Option<&'v Value>) -> Result<(&F, PluginSection<'v>), ConfigError> {
        let section = match section {
            None | Some(Value::Null) => return Err(ConfigError::MissingSection(self.category)),
            Some(value) => PluginSection::from_value(self.category, value)?,
        };
        let factory = self.find(&section.plugin_type, &section.version).ok_or_else(|| {
            ConfigError::UnknownPlugin {
                category: self.category,
                plugin_type: section.plugin_type.clone(),
                version: section.version.clone(),
            }
        })?;
        Ok((factory, section))
    }

    fn report<T>(&self, result: Result<(PluginId, T), ConfigError>) -> Option<(PluginId, T)> {
        match result {
            Ok((id, plugin)) => {
                tracing::info!(category = %self.category, plugin = %id, "plugin created");
                Some((id, plugin))
            }
            Err(err) => {
                tracing::error!(category = %self.category, error = %err, "no plugin created");
                None
            }
        }
    }
}

impl FilterRegistry {
    /// Registry of the built-in selection policies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(PluginCategory::Filter);
        for factory in tia_filter::builtin_factories() {
            registry.register(factory);
        }
        registry
    }

    /// Create the selection policy a `filter` section describes
    ///
    /// # Errors
    /// Returns [`ConfigError`] if no factory is selected or the factory
    /// rejects the section's `config`
    pub fn try_create(
        &self,
        section: Option<&Value>,
        paths: &PathResolver,
    ) -> Result<(PluginId, Box<dyn ApplicationProcessor>), ConfigError> {
        let (factory, section) = self.select(section)?;
        let policy = factory.create_application_processor(section.config, paths)?;
        Ok((PluginId::new(section.plugin_type, section.version), policy))
    }

    /// Create the selection policy, logging why none could be created
    #[must_use]
    pub fn create(
        &self,
        section: Option<&Value>,
        paths: &PathResolver,
    ) -> Option<(PluginId, Box<dyn ApplicationProcessor>)> {
        self.report(self.try_create(section, paths))
    }
}

impl GeneratorRegistry {
    /// Registry of the built-in trace generators
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(PluginCategory::Generator);
        for factory in tia_codegen::builtin_factories() {
            registry.register(factory);
        }
        registry
    }

    /// Create the trace generator a `generator` section describes
    ///
    /// # Errors
    /// Returns [`ConfigError`] if no factory is selected or the factory
    /// rejects the section's `config`
    pub fn try_create(&self, section: Option<&Value>) -> Result<(PluginId, Box<dyn TraceGenerator>), ConfigError> {
        let (factory, section) = self.select(section)?;
        let generator = factory.create_trace_generator(section.config)?;
        Ok((PluginId::new(section.plugin_type, section.version), generator))
    }

    /// Create the trace generator, logging why none could be created
    #[must_use]
    pub fn create(&self, section: Option<&Value>) -> Option<(PluginId, Box<dyn TraceGenerator>)> {
        self.report(self.try_create(section))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tia_runtime::PluginError;

    #[test]
    fn defaults() {
        let filters = FilterRegistry::with_defaults();
        assert_eq!(filters.category(), PluginCategory::Filter);
        assert_eq!(
            filters.plugin_ids(),
            [PluginId::new("package", "1.0"), PluginId::new("sym-ref-tables", "1.0")]
        );

        let generators = GeneratorRegistry::with_defaults();
        assert_eq!(generators.len(), 2);
        assert!(generators.find("println", "1.0").is_some());
        assert!(generators.find("println", "2.0").is_none());
    }

    #[test]
    fn creates_matching_plugin() {
        let filters = FilterRegistry::with_defaults();
        let section = json!({"type": "package", "version": "1.0", "config": "acme"});
        let (id, policy) = filters.try_create(Some(&section), &PathResolver::unanchored()).unwrap();

        assert_eq!(id.to_string(), "package 1.0");
        assert!(policy.accept_unit_name("acme/Widget"));
    }

    #[test]
    fn diagnoses_unusable_sections() {
        let generators = GeneratorRegistry::with_defaults();

        assert!(matches!(
            generators.try_create(None),
            Err(ConfigError::MissingSection(PluginCategory::Generator))
        ));
        assert!(matches!(
            generators.try_create(Some(&json!({"type": "println"}))),
            Err(ConfigError::MalformedSection { .. })
        ));
        assert!(matches!(
            generators.try_create(Some(&json!({"type": "println", "version": "9"}))),
            Err(ConfigError::UnknownPlugin { .. })
        ));
        assert!(generators.create(Some(&json!([]))).is_none());
    }

    #[test]
    fn plugin_errors_pass_through() {
        let filters = FilterRegistry::with_defaults();
        let section = json!({"type": "package", "version": "1.0"});

        assert!(matches!(
            filters.try_create(Some(&section), &PathResolver::unanchored()),
            Err(ConfigError::Plugin(PluginError::MissingConfig { .. }))
        ));
    }

    #[test]
    fn empty_registry_matches_nothing() {
        let filters = FilterRegistry::new(PluginCategory::Filter);
        assert!(filters.is_empty());
        let section = json!({"type": "package", "version": "1.0", "config": "acme"});
        assert!(filters.create(Some(&section), &PathResolver::unanchored()).is_none());
    }
}
