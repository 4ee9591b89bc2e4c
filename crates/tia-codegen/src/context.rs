//! Input of snippet generation

use crate::location::TraceInjectionLocation;

/// Everything a generator may embed in a snippet
///
/// Built by the orchestrator from the policy's decisions for one behavior and
/// location; borrowed for the duration of a single `generate_snippet` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext<'a> {
    /// Policy's instrumentation version
    pub instrumentation_version: &'a str,
    /// Class name shown in traces
    pub class_name: &'a str,
    /// Source path shown in traces
    pub source_path: &'a str,
    /// Method name shown in traces
    pub method_name: &'a str,
    /// Method signature shown in traces
    pub method_signature: &'a str,
    /// Entry or exit
    pub location: TraceInjectionLocation,
}

impl<'a> TraceContext<'a> {
    /// Same context at another location
    #[inline]
    #[must_use]
    pub fn at(self, location: TraceInjectionLocation) -> Self {
        Self { location, ..self }
    }

    /// Check that the identifying fields are present
    ///
    /// # Errors
    /// Returns [`CodegenError::EmptyField`](crate::CodegenError::EmptyField)
    /// naming the first empty field
    pub fn require_identity(&self) -> Result<(), crate::CodegenError> {
        if self.class_name.is_empty() {
            return Err(crate::CodegenError::EmptyField("class name"));
        }
        if self.method_name.is_empty() {
            return Err(crate::CodegenError::EmptyField("method name"));
        }
        Ok(())
    }
}
