//! Log-statement generator: a logger call keyed by class and method name

use crate::context::TraceContext;
use crate::error::CodegenError;
use crate::generator::{string_literal, TraceGenerator, TraceGeneratorFactory};
use serde_json::Value;
use tia_runtime::{PluginError, TypedFactory};

/// Plugin type of [`LoggingTraceFactory`]
pub const LOGGING_GENERATOR_TYPE: &str = "logging";

/// Emits `Logger.getLogger(class).entering(class, method, threadId)` and the
/// matching `exiting` call
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTraceGenerator;

impl TraceGenerator for LoggingTraceGenerator {
    fn generate_snippet(&self, ctx: &TraceContext<'_>) -> Result<String, CodegenError> {
        ctx.require_identity()?;
        let class_name = string_literal(ctx.class_name);
        Ok(format!(
            "java.util.logging.Logger.getLogger({class_name}).{call}({class_name},{method},\
             java.lang.String.valueOf(java.lang.Thread.currentThread().getId()));",
            call = ctx.location.logging_name(),
            method = string_literal(ctx.method_name),
        ))
    }
}

/// Factory of [`LoggingTraceGenerator`]: `logging` 1.0
///
/// Takes no configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTraceFactory;

impl TypedFactory for LoggingTraceFactory {
    fn plugin_type(&self) -> &str {
        LOGGING_GENERATOR_TYPE
    }
}

impl TraceGeneratorFactory for LoggingTraceFactory {
    fn create_trace_generator(&self, _config: Option<&Value>) -> Result<Box<dyn TraceGenerator>, PluginError> {
        Ok(Box::new(LoggingTraceGenerator))
    }
}
