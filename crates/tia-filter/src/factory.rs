//! Factories creating selection policies from configuration

use crate::correlation::TableFilterFactory;
use crate::prefix::PackageFilterFactory;
use crate::processor::ApplicationProcessor;
use serde_json::Value;
use tia_runtime::{PathResolver, PluginError, TypedFactory};

/// Factory of one kind of selection policy
pub trait ApplicationProcessorFactory: TypedFactory {
    /// Create the policy from the `config` value of the filter section
    ///
    /// # Errors
    /// Returns [`PluginError`] when the value is missing, malformed or names
    /// resources that do not exist
    fn create_application_processor(
        &self,
        config: Option<&Value>,
        paths: &PathResolver,
    ) -> Result<Box<dyn ApplicationProcessor>, PluginError>;
}

/// Factories of the built-in selection policies
#[must_use]
pub fn builtin_factories() -> Vec<Box<dyn ApplicationProcessorFactory>> {
    vec![Box::new(PackageFilterFactory), Box::new(TableFilterFactory)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_distinct_version_one() {
        let factories = builtin_factories();
        let types: Vec<&str> = factories.iter().map(|f| f.plugin_type()).collect();

        assert_eq!(types, ["package", "sym-ref-tables"]);
        assert!(factories.iter().all(|f| f.plugin_version() == "1.0"));
    }
}
