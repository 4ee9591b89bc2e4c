//! Decision hierarchy of a selection policy
//!
//! A policy answers three nested questions for each load event:
//! [`ApplicationProcessor`] (is this unit interesting?), [`ClassProcessor`]
//! (how is this unit presented?) and [`MethodProcessor`] (how is this
//! behavior presented?). Decisions borrow the unit they were made for and
//! never outlive the load event.

use std::borrow::Cow;
use std::fmt;
use tia_runtime::{Behavior, CompiledUnit, TypeName, NESTED_SEPARATOR};

/// Instrumentation version reported when a policy has none of its own
pub const DEFAULT_INSTRUMENTATION_VERSION: &str = "1.0";

/// Top-level selection policy
pub trait ApplicationProcessor: Send + Sync + fmt::Debug {
    /// Cheap pre-check on the internal unit name (`acme/Widget$Part`)
    ///
    /// Runs before the unit is parsed.
    fn accept_unit_name(&self, unit_name: &str) -> bool;

    /// Unit decision for a parsed unit, or `None` to leave it untouched
    fn accept_unit<'a>(&'a self, unit: &'a CompiledUnit) -> Option<Box<dyn ClassProcessor + 'a>>;

    /// Version embedded in generated trace snippets
    fn instrumentation_version(&self) -> &str {
        DEFAULT_INSTRUMENTATION_VERSION
    }
}

/// Unit-level decision
pub trait ClassProcessor {
    /// Unit the decision was made for
    fn unit(&self) -> &CompiledUnit;

    /// Class name shown in traces
    fn class_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.unit().name())
    }

    /// Source path shown in traces
    fn source_path(&self) -> Cow<'_, str> {
        Cow::Owned(self.unit().default_source_path())
    }

    /// Behavior decision, or `None` to skip the behavior
    fn accept_behavior<'b>(&'b self, behavior: &'b Behavior) -> Option<Box<dyn MethodProcessor + 'b>>;
}

/// Behavior-level decision
pub trait MethodProcessor {
    /// Behavior the decision was made for
    fn behavior(&self) -> &Behavior;

    /// Method name shown in traces
    fn method_name(&self) -> &str;

    /// Method signature shown in traces
    fn method_signature(&self) -> &str;
}

/// Behavior decision with its presentation computed up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMethod<'a> {
    behavior: &'a Behavior,
    name: &'a str,
    signature: String,
}

impl<'a> ResolvedMethod<'a> {
    /// Create decision with an already resolved signature
    #[must_use]
    pub fn new(unit: &CompiledUnit, behavior: &'a Behavior, signature: impl Into<String>) -> Self {
        Self {
            behavior,
            name: method_name(unit, behavior),
            signature: signature.into(),
        }
    }

    /// Create decision presenting the behavior's own signature
    #[must_use]
    pub fn with_default_signature(unit: &CompiledUnit, behavior: &'a Behavior) -> Self {
        let signature = default_signature(unit, behavior);
        Self::new(unit, behavior, signature)
    }
}

impl MethodProcessor for ResolvedMethod<'_> {
    fn behavior(&self) -> &Behavior {
        self.behavior
    }

    fn method_name(&self) -> &str {
        self.name
    }

    fn method_signature(&self) -> &str {
        &self.signature
    }
}

/// Method name shown for a behavior
///
/// Constructors of nested units are named after the nested unit alone
/// (`Example$Another` → `Another`).
#[must_use]
pub fn method_name<'a>(unit: &CompiledUnit, behavior: &'a Behavior) -> &'a str {
    let name = behavior.name();
    if behavior.is_constructor() && unit.is_nested() {
        return name
            .rfind(NESTED_SEPARATOR)
            .map_or(name, |idx| &name[idx + NESTED_SEPARATOR.len_utf8()..]);
    }
    name
}

/// Source-level parameter types of a behavior
///
/// Constructors of inner (non-static nested) units drop the implicit
/// enclosing-instance parameter.
#[must_use]
pub fn parameter_types<'a>(unit: &CompiledUnit, behavior: &'a Behavior) -> &'a [TypeName] {
    let params = behavior.parameter_types();
    if has_enclosing_parameter(unit, behavior) && !params.is_empty() {
        return &params[1..];
    }
    params
}

/// Source-level generic parameter types of a behavior
///
/// `None` when the behavior records none or when the generic and raw parameter
/// counts disagree. The enclosing-instance parameter is dropped the same way as
/// in [`parameter_types`].
#[must_use]
pub fn generic_parameter_types<'a>(unit: &CompiledUnit, behavior: &'a Behavior) -> Option<&'a [String]> {
    let generic = behavior.generic_parameter_types()?;
    if generic.len() != behavior.parameter_types().len() {
        return None;
    }
    if has_enclosing_parameter(unit, behavior) && !generic.is_empty() {
        return Some(&generic[1..]);
    }
    Some(generic)
}

/// Signature built from the behavior itself: `name(T1, T2)`
///
/// Parameter types use their simple source-level names.
#[must_use]
pub fn default_signature(unit: &CompiledUnit, behavior: &Behavior) -> String {
    let params: Vec<String> = parameter_types(unit, behavior)
        .iter()
        .map(TypeName::source_simple_name)
        .collect();
    format!("{}({})", method_name(unit, behavior), params.join(", "))
}

fn has_enclosing_parameter(unit: &CompiledUnit, behavior: &Behavior) -> bool {
    behavior.is_constructor() && unit.is_nested() && !unit.is_static_nested()
}
