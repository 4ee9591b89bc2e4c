//! Console-print generator: one line on standard output or standard error

use crate::context::TraceContext;
use crate::error::CodegenError;
use crate::generator::{string_literal, TraceGenerator, TraceGeneratorFactory};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use tia_runtime::{PluginError, TypedFactory};

/// Plugin type of [`PrintTraceFactory`]
pub const PRINT_GENERATOR_TYPE: &str = "println";

/// Standard stream the trace line is printed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputStream {
    /// Standard output
    #[default]
    Out,
    /// Standard error
    Err,
}

impl OutputStream {
    /// Field name of the stream (`out`, `err`)
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::Err => "err",
        }
    }

    /// Stream named by `name`, if any
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "out" => Some(Self::Out),
            "err" => Some(Self::Err),
            _ => None,
        }
    }
}

impl Display for OutputStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emits a `println` of `|version|timestamp,[threadId],Label path::class::signature|`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintTraceGenerator {
    stream: OutputStream,
}

impl PrintTraceGenerator {
    /// Create generator printing to `stream`
    #[inline]
    #[must_use]
    pub fn new(stream: OutputStream) -> Self {
        Self { stream }
    }

    /// Target stream
    #[inline]
    #[must_use]
    pub fn stream(&self) -> OutputStream {
        self.stream
    }
}

impl TraceGenerator for PrintTraceGenerator {
    fn generate_snippet(&self, ctx: &TraceContext<'_>) -> Result<String, CodegenError> {
        ctx.require_identity()?;
        let version = string_literal(&format!("|{}|", ctx.instrumentation_version));
        let message = string_literal(&format!(
            "{} {}::{}::{}|",
            ctx.location.print_name(),
            ctx.source_path,
            ctx.class_name,
            ctx.method_signature
        ));
        Ok(format!(
            "java.lang.System.{stream}.println({version}\
             +java.lang.String.valueOf(java.lang.System.currentTimeMillis())\
             +\",[\"+java.lang.String.valueOf(java.lang.Thread.currentThread().getId())+\"],\"\
             +{message});",
            stream = self.stream,
        ))
    }
}

/// Factory of [`PrintTraceGenerator`]: `println` 1.0
///
/// `config` is `"out"`, `"err"` or absent. Anything else falls back to `out`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintTraceFactory;

impl PrintTraceFactory {
    fn stream(config: Option<&Value>) -> OutputStream {
        match config {
            None | Some(Value::Null) => OutputStream::default(),
            Some(Value::String(name)) => OutputStream::from_name(name.trim()).unwrap_or_else(|| {
                tracing::warn!(stream = %name, "unknown output stream, printing to out");
                OutputStream::default()
            }),
            Some(other) => {
                tracing::warn!(stream = %other, "unknown output stream, printing to out");
                OutputStream::default()
            }
        }
    }
}

impl TypedFactory for PrintTraceFactory {
    fn plugin_type(&self) -> &str {
        PRINT_GENERATOR_TYPE
    }
}

impl TraceGeneratorFactory for PrintTraceFactory {
    fn create_trace_generator(&self, config: Option<&Value>) -> Result<Box<dyn TraceGenerator>, PluginError> {
        let stream = Self::stream(config);
        tracing::info!(%stream, "printing traces");
        Ok(Box::new(PrintTraceGenerator::new(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::TraceInjectionLocation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn context(location: TraceInjectionLocation) -> TraceContext<'static> {
        TraceContext {
            instrumentation_version: "v1",
            class_name: "C",
            source_path: "p",
            method_name: "m",
            method_signature: "m()",
            location,
        }
    }

    #[test]
    fn entry_line_layout() {
        let snippet = PrintTraceGenerator::default()
            .generate_snippet(&context(TraceInjectionLocation::Entry))
            .unwrap();

        assert_eq!(snippet.matches("|v1|").count(), 1);
        assert!(snippet.contains("Entering p::C::m()"));
        assert_eq!(
            snippet,
            "java.lang.System.out.println(\"|v1|\"\
             +java.lang.String.valueOf(java.lang.System.currentTimeMillis())\
             +\",[\"+java.lang.String.valueOf(java.lang.Thread.currentThread().getId())+\"],\"\
             +\"Entering p::C::m()|\");"
        );
    }

    #[test]
    fn exit_line_on_err() {
        let snippet = PrintTraceGenerator::new(OutputStream::Err)
            .generate_snippet(&context(TraceInjectionLocation::Exit))
            .unwrap();

        assert!(snippet.starts_with("java.lang.System.err.println("));
        assert!(snippet.contains("Exiting p::C::m()|"));
    }

    #[test]
    fn escapes_embedded_text() {
        let ctx = TraceContext {
            source_path: r"C:\src\p",
            method_signature: r#"m(String "q")"#,
            ..context(TraceInjectionLocation::Entry)
        };
        let snippet = PrintTraceGenerator::default().generate_snippet(&ctx).unwrap();
        assert!(snippet.contains(r#"Entering C:\\src\\p::C::m(String \"q\")|"#));
    }

    #[test]
    fn factory_stream_selection() {
        let stream = |config: Option<Value>| PrintTraceFactory::stream(config.as_ref());

        assert_eq!(stream(None), OutputStream::Out);
        assert_eq!(stream(Some(json!("err"))), OutputStream::Err);
        assert_eq!(stream(Some(json!("out"))), OutputStream::Out);
        assert_eq!(stream(Some(json!("printer"))), OutputStream::Out);
        assert_eq!(stream(Some(json!(2))), OutputStream::Out);
    }
}
