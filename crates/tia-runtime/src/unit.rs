//! Compiled units and their behaviors
//!
//! Provides [`CompiledUnit`] and [`Behavior`], the read-only view the engine
//! gets of a unit parsed by the external rewriter.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Separator between an enclosing unit and a nested one (`Outer$Inner`)
pub const NESTED_SEPARATOR: char = '$';

/// Package separator in the runtime's internal name form (`acme/Widget`)
pub const INTERNAL_SEPARATOR: char = '/';

/// Package separator in the dotted name form (`acme.Widget`)
pub const PACKAGE_SEPARATOR: char = '.';

/// Source file extension assumed when a unit records no source file
pub const DEFAULT_SOURCE_EXTENSION: &str = "java";

/// Fully qualified type name of a parameter
///
/// Holds the runtime's binary name (`java.util.Map$Entry`, `int`, `java.lang.String[]`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Create type name from its binary form
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Binary name as given by the runtime
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without its package (`Map$Entry`)
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0
            .rfind(PACKAGE_SEPARATOR)
            .map_or(self.0.as_str(), |idx| &self.0[idx + 1..])
    }

    /// Fully qualified source-level name (`java.util.Map.Entry`)
    #[must_use]
    pub fn source_name(&self) -> String {
        self.0.replace(NESTED_SEPARATOR, ".")
    }

    /// Simple source-level name (`Map.Entry`)
    #[must_use]
    pub fn source_simple_name(&self) -> String {
        self.simple_name().replace(NESTED_SEPARATOR, ".")
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Method or constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    /// Regular method
    #[default]
    Method,

    /// Constructor
    Constructor,
}

/// How a unit is nested inside another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    /// Not nested
    #[default]
    TopLevel,

    /// Inner, local or anonymous unit carrying an implicit outer instance
    Inner,

    /// Static nested unit (no outer instance)
    StaticNested,
}

/// A method or constructor of a [`CompiledUnit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    index: usize,
    name: String,
    kind: BehaviorKind,
    parameter_types: Vec<TypeName>,
    generic_parameter_types: Option<Vec<String>>,
    is_abstract: bool,
    is_native: bool,
}

impl Behavior {
    /// Create method behavior
    #[inline]
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::new(name, BehaviorKind::Method)
    }

    /// Create constructor behavior
    ///
    /// `name` is the runtime name of the constructor, which for nested units
    /// is the binary simple name (`Example$Another`).
    #[inline]
    #[must_use]
    pub fn constructor(name: impl Into<String>) -> Self {
        Self::new(name, BehaviorKind::Constructor)
    }

    /// Create behavior of given kind
    #[must_use]
    pub fn new(name: impl Into<String>, kind: BehaviorKind) -> Self {
        Self {
            index: 0,
            name: name.into(),
            kind,
            parameter_types: Vec::new(),
            generic_parameter_types: None,
            is_abstract: false,
            is_native: false,
        }
    }

    /// Set parameter types
    #[must_use]
    pub fn with_parameters<I, T>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.parameter_types = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Set generic parameter types from the generic signature
    #[must_use]
    pub fn with_generic_parameters<I, T>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.generic_parameter_types = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    /// Mark as abstract
    #[inline]
    #[must_use]
    pub fn into_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as native
    #[inline]
    #[must_use]
    pub fn into_native(mut self) -> Self {
        self.is_native = true;
        self
    }

    /// Position within the owning unit
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Runtime name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method or constructor
    #[inline]
    #[must_use]
    pub fn kind(&self) -> BehaviorKind {
        self.kind
    }

    /// Check if this is a constructor
    #[inline]
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.kind == BehaviorKind::Constructor
    }

    /// Declared parameter types, including any implicit outer-instance parameter
    #[inline]
    #[must_use]
    pub fn parameter_types(&self) -> &[TypeName] {
        &self.parameter_types
    }

    /// Generic parameter types, if the behavior has a generic signature
    #[inline]
    #[must_use]
    pub fn generic_parameter_types(&self) -> Option<&[String]> {
        self.generic_parameter_types.as_deref()
    }

    /// Check if abstract
    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Check if native
    #[inline]
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.is_native
    }

    /// Only behaviors with a body can be instrumented
    #[inline]
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.is_abstract && !self.is_native
    }
}

impl Display for Behavior {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameter_types.iter().map(TypeName::as_str).collect();
        write!(f, "{}({})", self.name, params.join(","))
    }
}

/// A program unit (class) parsed by the external rewriter
///
/// Owned by the orchestrator for the duration of a single load event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    name: String,
    nesting: Nesting,
    source_file: Option<String>,
    behaviors: Vec<Behavior>,
}

impl CompiledUnit {
    /// Create unit from its dotted binary name (`acme.Widget$Part`)
    ///
    /// Nesting defaults to [`Nesting::Inner`] when the name carries a nested
    /// separator, [`Nesting::TopLevel`] otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let nesting = if name.contains(NESTED_SEPARATOR) {
            Nesting::Inner
        } else {
            Nesting::TopLevel
        };
        Self {
            name,
            nesting,
            source_file: None,
            behaviors: Vec::new(),
        }
    }

    /// Set nesting
    #[inline]
    #[must_use]
    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    /// Set recorded source file name (`Widget.java`)
    #[inline]
    #[must_use]
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Append behavior, assigning its index
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.push_behavior(behavior);
        self
    }

    /// Append behavior, assigning its index
    pub fn push_behavior(&mut self, mut behavior: Behavior) {
        behavior.index = self.behaviors.len();
        self.behaviors.push(behavior);
    }

    /// Dotted binary name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Internal name as seen by load hooks (`acme/Widget$Part`)
    #[must_use]
    pub fn internal_name(&self) -> String {
        self.name.replace(PACKAGE_SEPARATOR, "/")
    }

    /// Dotted package name, if any
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.name.rfind(PACKAGE_SEPARATOR).map(|idx| &self.name[..idx])
    }

    /// Simple name of the outermost enclosing unit (`Widget` for `acme.Widget$Part`)
    #[must_use]
    pub fn top_level_simple_name(&self) -> &str {
        let simple = self
            .name
            .rfind(PACKAGE_SEPARATOR)
            .map_or(self.name.as_str(), |idx| &self.name[idx + 1..]);
        simple.split(NESTED_SEPARATOR).next().unwrap_or(simple)
    }

    /// Nesting
    #[inline]
    #[must_use]
    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    /// Check if nested in another unit
    #[inline]
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.nesting != Nesting::TopLevel
    }

    /// Check if a static nested unit
    #[inline]
    #[must_use]
    pub fn is_static_nested(&self) -> bool {
        self.nesting == Nesting::StaticNested
    }

    /// Recorded source file name
    #[inline]
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Ordered behaviors
    #[inline]
    #[must_use]
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    /// Behavior by index
    #[inline]
    #[must_use]
    pub fn behavior(&self, index: usize) -> Option<&Behavior> {
        self.behaviors.get(index)
    }

    /// Source path derived from the unit's own identity
    ///
    /// Package directory joined with the recorded source file, or with the
    /// outermost unit's simple name plus [`DEFAULT_SOURCE_EXTENSION`].
    #[must_use]
    pub fn default_source_path(&self) -> String {
        let file = match &self.source_file {
            Some(file) => file.clone(),
            None => format!("{}.{DEFAULT_SOURCE_EXTENSION}", self.top_level_simple_name()),
        };
        match self.package_name() {
            Some(package) => format!("{}/{file}", package.replace(PACKAGE_SEPARATOR, "/")),
            None => file,
        }
    }
}

impl Display for CompiledUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
