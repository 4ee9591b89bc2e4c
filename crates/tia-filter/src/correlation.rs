//! Correlation policy: trace units known to a symbol and reference table pair
//!
//! A unit is accepted when the reference table lists its fully qualified name;
//! the first candidate symbol then supplies the class name, source path and
//! the canonical signature of each behavior. Behaviors that cannot be matched
//! to a function entry are skipped.

use crate::factory::ApplicationProcessorFactory;
use crate::processor::{
    default_signature, generic_parameter_types, method_name, parameter_types, ApplicationProcessor,
    ClassProcessor, MethodProcessor, ResolvedMethod,
};
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tia_runtime::{Behavior, CompiledUnit, PathResolver, PluginError, TypeName, TypedFactory};
use tia_symbol::{fqcn_key, is_overload_key, raw_type, FunctionEntry, SymbolEntry, TableSet};

/// Plugin type of [`TableFilterFactory`]
pub const TABLE_FILTER_TYPE: &str = "sym-ref-tables";

/// Suffix appended to the source file of a symbol without canonical signatures
const CLASS_SOURCE_SUFFIX: &str = ":class";

/// Accepts units listed in a reference table
///
/// A policy whose tables failed to load rejects every unit.
#[derive(Debug, Clone, Default)]
pub struct CorrelationPolicy {
    tables: Option<TableSet>,
    version: Option<String>,
}

impl CorrelationPolicy {
    /// Create policy over loaded tables
    #[must_use]
    pub fn new(tables: TableSet) -> Self {
        let version = tables.references.version();
        Self {
            tables: Some(tables),
            version,
        }
    }

    /// Create policy that rejects every unit
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Load tables from a directory
    ///
    /// Load failures are logged and yield a [`disabled`](Self::disabled) policy.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        match TableSet::load(dir) {
            Ok(tables) => Self::new(tables),
            Err(err) => {
                tracing::error!(
                    dir = %dir.display(),
                    file = %err.path().display(),
                    error = %err,
                    "failed to load symbol tables, no unit will be traced"
                );
                Self::disabled()
            }
        }
    }

    /// Check if tables are loaded
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.tables.is_some()
    }

    /// Loaded tables
    #[inline]
    #[must_use]
    pub fn tables(&self) -> Option<&TableSet> {
        self.tables.as_ref()
    }
}

impl ApplicationProcessor for CorrelationPolicy {
    fn accept_unit_name(&self, unit_name: &str) -> bool {
        self.tables
            .as_ref()
            .is_some_and(|tables| tables.references.contains(&fqcn_key(unit_name)))
    }

    fn accept_unit<'a>(&'a self, unit: &'a CompiledUnit) -> Option<Box<dyn ClassProcessor + 'a>> {
        let tables = self.tables.as_ref()?;
        let (symbol_key, symbol) = tables.first_candidate(&fqcn_key(unit.name()))?;
        Some(Box::new(CorrelationClassDecision {
            unit,
            symbol_key,
            symbol,
        }))
    }

    fn instrumentation_version(&self) -> &str {
        self.version
            .as_deref()
            .unwrap_or(crate::processor::DEFAULT_INSTRUMENTATION_VERSION)
    }
}

/// Unit decision of [`CorrelationPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct CorrelationClassDecision<'a> {
    unit: &'a CompiledUnit,
    symbol_key: &'a str,
    symbol: &'a SymbolEntry,
}

impl<'a> CorrelationClassDecision<'a> {
    /// Symbol key the unit resolved to
    #[inline]
    #[must_use]
    pub fn symbol_key(&self) -> &'a str {
        self.symbol_key
    }
}

impl ClassProcessor for CorrelationClassDecision<'_> {
    fn unit(&self) -> &CompiledUnit {
        self.unit
    }

    fn class_name(&self) -> Cow<'_, str> {
        if self.symbol.has_canonical_signatures() {
            Cow::Borrowed(self.unit.name())
        } else {
            Cow::Borrowed(self.symbol_key)
        }
    }

    fn source_path(&self) -> Cow<'_, str> {
        match &self.symbol.file {
            Some(file) if self.symbol.has_canonical_signatures() => Cow::Borrowed(file.as_str()),
            Some(file) => Cow::Owned(format!("{file}{CLASS_SOURCE_SUFFIX}")),
            None => Cow::Owned(self.unit.default_source_path()),
        }
    }

    fn accept_behavior<'b>(&'b self, behavior: &'b Behavior) -> Option<Box<dyn MethodProcessor + 'b>> {
        let signature = resolve_signature(self.symbol, self.unit, behavior)?;
        Some(Box::new(ResolvedMethod::new(self.unit, behavior, signature)))
    }
}

/// Signature a symbol entry gives a behavior, if any
///
/// The behavior's own signature is used when the entry lists it among its
/// canonical signatures. Otherwise the function list is searched under the
/// method name and then under its overload keys (`name [overloaded_N]`); the
/// first entry whose arguments match yields the canonical signature, or the
/// function key when the entry has no canonical signatures.
#[must_use]
pub fn resolve_signature(symbol: &SymbolEntry, unit: &CompiledUnit, behavior: &Behavior) -> Option<String> {
    let direct = default_signature(unit, behavior);
    if symbol.has_canonical_signature(&direct) {
        return Some(direct);
    }

    let name = method_name(unit, behavior);
    if let Some(signature) = symbol
        .function(name)
        .and_then(|function| match_function(symbol, name, function, unit, behavior))
    {
        return Some(signature);
    }

    symbol
        .functions()
        .filter(|(key, _)| is_overload_key(key, name))
        .find_map(|(key, function)| match_function(symbol, key, function, unit, behavior))
}

fn match_function(
    symbol: &SymbolEntry,
    key: &str,
    function: &FunctionEntry,
    unit: &CompiledUnit,
    behavior: &Behavior,
) -> Option<String> {
    let args = function.args.as_ref()?;
    let params = parameter_types(unit, behavior);
    if args.len() != params.len() {
        return None;
    }

    let mut generics: Option<Option<&[String]>> = None;
    for (idx, (arg, param)) in args.values().zip(params).enumerate() {
        let declared = raw_type(arg.declared_type.as_deref()?);
        if parameter_matches(&declared, param) {
            continue;
        }
        let generic = *generics.get_or_insert_with(|| generic_parameter_types(unit, behavior));
        if generic.and_then(|types| types.get(idx)) != Some(&declared) {
            return None;
        }
    }

    if symbol.has_canonical_signatures() {
        function.signature.clone()
    } else {
        Some(key.to_string())
    }
}

fn parameter_matches(declared: &str, param: &TypeName) -> bool {
    let qualified = param.source_name();
    declared == param.source_simple_name()
        || declared == qualified
        || qualified
            .strip_suffix(declared)
            .is_some_and(|head| head.ends_with('.'))
}

/// Factory of [`CorrelationPolicy`]: `sym-ref-tables` 1.0
///
/// `config` names the table directory, resolved against the agent
/// configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableFilterFactory;

impl TableFilterFactory {
    fn table_dir(config: Option<&Value>, paths: &PathResolver) -> Result<PathBuf, PluginError> {
        let dir = match config {
            None | Some(Value::Null) => return Err(PluginError::missing_config(TABLE_FILTER_TYPE)),
            Some(Value::String(dir)) if !dir.trim().is_empty() => dir,
            Some(other) => {
                return Err(PluginError::invalid_config(
                    TABLE_FILTER_TYPE,
                    format!("expected table directory, got {other}"),
                ))
            }
        };
        let resolved = paths.resolve(dir.trim());
        if !resolved.is_dir() {
            return Err(PluginError::missing_resource(TABLE_FILTER_TYPE, resolved));
        }
        Ok(resolved)
    }
}

impl TypedFactory for TableFilterFactory {
    fn plugin_type(&self) -> &str {
        TABLE_FILTER_TYPE
    }
}

impl ApplicationProcessorFactory for TableFilterFactory {
    fn create_application_processor(
        &self,
        config: Option<&Value>,
        paths: &PathResolver,
    ) -> Result<Box<dyn ApplicationProcessor>, PluginError> {
        let dir = Self::table_dir(config, paths)?;
        tracing::info!(dir = %dir.display(), "tracing units listed in symbol tables");
        Ok(Box::new(CorrelationPolicy::load(&dir)))
    }
}
