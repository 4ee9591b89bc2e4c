//! Generator and factory traits

use crate::context::TraceContext;
use crate::error::CodegenError;
use crate::logging::LoggingTraceFactory;
use crate::print::PrintTraceFactory;
use serde_json::Value;
use std::fmt;
use tia_runtime::{PluginError, TypedFactory};

/// Produces the source snippet inserted at one location of a behavior
///
/// Generation is pure: the same context always yields the same snippet.
pub trait TraceGenerator: Send + Sync + fmt::Debug {
    /// Snippet for the given context
    ///
    /// # Errors
    /// Returns [`CodegenError`] when the context cannot be rendered
    fn generate_snippet(&self, ctx: &TraceContext<'_>) -> Result<String, CodegenError>;
}

/// Factory of one kind of trace generator
pub trait TraceGeneratorFactory: TypedFactory {
    /// Create the generator from the `config` value of the generator section
    ///
    /// # Errors
    /// Returns [`PluginError`] when the value cannot configure a generator
    fn create_trace_generator(&self, config: Option<&Value>) -> Result<Box<dyn TraceGenerator>, PluginError>;
}

/// Factories of the built-in trace generators
#[must_use]
pub fn builtin_factories() -> Vec<Box<dyn TraceGeneratorFactory>> {
    vec![Box::new(LoggingTraceFactory), Box::new(PrintTraceFactory)]
}

/// Text as a double-quoted source string literal
#[must_use]
pub fn string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            literal.push('\\');
        }
        literal.push(c);
    }
    literal.push('"');
    literal
}
