//! Prefix policy: trace every unit under a set of packages

use crate::factory::ApplicationProcessorFactory;
use crate::processor::{ApplicationProcessor, ClassProcessor, MethodProcessor, ResolvedMethod};
use serde_json::Value;
use std::collections::BTreeSet;
use tia_runtime::{
    Behavior, CompiledUnit, PathResolver, PluginError, TypedFactory, INTERNAL_SEPARATOR,
    PACKAGE_SEPARATOR,
};

/// Plugin type of [`PackageFilterFactory`]
pub const PACKAGE_FILTER_TYPE: &str = "package";

/// Accepts units whose internal name starts with a configured package prefix
///
/// Prefixes are stored in internal form with a trailing separator
/// (`a.b` → `a/b/`). Matching is a plain string-prefix test, so `a/b/` also
/// covers every sub-package of `a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixPolicy {
    prefixes: BTreeSet<String>,
}

impl PrefixPolicy {
    /// Create policy from dotted package names
    ///
    /// Names are trimmed; blank names are ignored.
    #[must_use]
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = packages
            .into_iter()
            .filter_map(|package| internal_prefix(package.as_ref()))
            .collect();
        Self { prefixes }
    }

    /// Normalized prefixes
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// Check if no prefix survived normalization
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

fn internal_prefix(package: &str) -> Option<String> {
    let package = package.trim();
    if package.is_empty() {
        return None;
    }
    let internal = package.replace(PACKAGE_SEPARATOR, "/");
    let internal = internal.trim_end_matches(INTERNAL_SEPARATOR);
    if internal.is_empty() {
        return None;
    }
    Some(format!("{internal}{INTERNAL_SEPARATOR}"))
}

impl ApplicationProcessor for PrefixPolicy {
    fn accept_unit_name(&self, unit_name: &str) -> bool {
        self.prefixes.iter().any(|prefix| unit_name.starts_with(prefix.as_str()))
    }

    fn accept_unit<'a>(&'a self, unit: &'a CompiledUnit) -> Option<Box<dyn ClassProcessor + 'a>> {
        Some(Box::new(PrefixClassDecision { unit }))
    }
}

/// Unit decision of [`PrefixPolicy`]
///
/// Presents the unit under its own name and default source path and accepts
/// every behavior.
#[derive(Debug, Clone, Copy)]
pub struct PrefixClassDecision<'a> {
    unit: &'a CompiledUnit,
}

impl ClassProcessor for PrefixClassDecision<'_> {
    fn unit(&self) -> &CompiledUnit {
        self.unit
    }

    fn accept_behavior<'b>(&'b self, behavior: &'b Behavior) -> Option<Box<dyn MethodProcessor + 'b>> {
        Some(Box::new(ResolvedMethod::with_default_signature(self.unit, behavior)))
    }
}

/// Factory of [`PrefixPolicy`]: `package` 1.0
///
/// `config` is one package name or an array of them. Primitive values are
/// taken as text; other array entries are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageFilterFactory;

impl PackageFilterFactory {
    fn packages(config: Option<&Value>) -> Result<Vec<String>, PluginError> {
        match config {
            None | Some(Value::Null) => Err(PluginError::missing_config(PACKAGE_FILTER_TYPE)),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .filter_map(|item| {
                    let package = primitive_text(item);
                    if package.is_none() {
                        tracing::warn!(entry = %item, "ignoring non-primitive package entry");
                    }
                    package
                })
                .collect()),
            Some(other) => primitive_text(other).map(|package| vec![package]).ok_or_else(|| {
                PluginError::invalid_config(
                    PACKAGE_FILTER_TYPE,
                    format!("expected package name or array of names, got {other}"),
                )
            }),
        }
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

impl TypedFactory for PackageFilterFactory {
    fn plugin_type(&self) -> &str {
        PACKAGE_FILTER_TYPE
    }
}

impl ApplicationProcessorFactory for PackageFilterFactory {
    fn create_application_processor(
        &self,
        config: Option<&Value>,
        _paths: &PathResolver,
    ) -> Result<Box<dyn ApplicationProcessor>, PluginError> {
        let policy = PrefixPolicy::new(Self::packages(config)?);
        if policy.is_empty() {
            return Err(PluginError::invalid_config(
                PACKAGE_FILTER_TYPE,
                "no non-blank package names",
            ));
        }
        let prefixes: Vec<&str> = policy.prefixes().collect();
        tracing::info!(packages = ?prefixes, "tracing units under packages");
        Ok(Box::new(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn normalizes_package_names() {
        let policy = PrefixPolicy::new([" example ", "", "a.b", "c/d/", "  "]);
        assert_eq!(policy.prefixes().collect::<Vec<_>>(), ["a/b/", "c/d/", "example/"]);
    }

    #[test]
    fn accepts_by_string_prefix() {
        let policy = PrefixPolicy::new(["example"]);

        assert!(policy.accept_unit_name("example/Example"));
        assert!(policy.accept_unit_name("example/sub/Deep$1"));
        assert!(!policy.accept_unit_name("examples/Example"));
        assert!(!policy.accept_unit_name("other/Example"));
    }

    #[test]
    fn prefix_covers_sub_packages() {
        let policy = PrefixPolicy::new(["a.b"]);
        assert!(policy.accept_unit_name("a/b/C"));
        assert!(policy.accept_unit_name("a/b/c/D"));
        assert!(!policy.accept_unit_name("a/bc/D"));
    }

    #[test]
    fn unit_decision_uses_default_presentation() {
        let policy = PrefixPolicy::new(["example"]);
        let unit = CompiledUnit::new("example.Example$Another")
            .with_source_file("Example.java")
            .with_behavior(Behavior::constructor("Example$Another").with_parameters(["example.Example"]))
            .with_behavior(Behavior::method("describe").with_parameters(["java.lang.String", "int"]));

        let class = policy.accept_unit(&unit).expect("always accepted");
        assert_eq!(class.class_name(), "example.Example$Another");
        assert_eq!(class.source_path(), "example/Example.java");

        let signatures: Vec<String> = unit
            .behaviors()
            .iter()
            .map(|b| class.accept_behavior(b).expect("always accepted").method_signature().to_string())
            .collect();
        assert_eq!(signatures, ["Another()", "describe(String, int)"]);
        assert_eq!(policy.instrumentation_version(), "1.0");
    }

    #[test]
    fn factory_accepts_string_or_array() {
        let paths = PathResolver::unanchored();
        let single = PackageFilterFactory
            .create_application_processor(Some(&json!("example")), &paths)
            .expect("single name");
        assert!(single.accept_unit_name("example/Example"));

        let many = PackageFilterFactory
            .create_application_processor(Some(&json!(["x.y", " example "])), &paths)
            .expect("array");
        assert!(many.accept_unit_name("x/y/Z"));
        assert!(many.accept_unit_name("example/Example"));

        let mixed = PackageFilterFactory
            .create_application_processor(Some(&json!(["a", 7, {"x": 1}])), &paths)
            .expect("primitives kept");
        assert!(mixed.accept_unit_name("a/B"));
        assert!(mixed.accept_unit_name("7/B"));
    }

    #[test]
    fn factory_rejects_unusable_config() {
        let paths = PathResolver::unanchored();
        let create = |config: Option<Value>| {
            PackageFilterFactory.create_application_processor(config.as_ref(), &paths)
        };

        assert!(matches!(create(None), Err(PluginError::MissingConfig { .. })));
        assert!(matches!(create(Some(json!({"package": "a"}))), Err(PluginError::InvalidConfig { .. })));
        assert!(matches!(create(Some(json!([null, {}]))), Err(PluginError::InvalidConfig { .. })));
        assert!(matches!(create(Some(json!([" ", ""]))), Err(PluginError::InvalidConfig { .. })));
    }
}
