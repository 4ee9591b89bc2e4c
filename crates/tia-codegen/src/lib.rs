//! TIA Trace Generators
//!
//! Render the source snippet inserted at the entry and exit of a traced
//! behavior.
//!
//! # Core Concepts
//!
//! - [`TraceContext`]: Presentation of one behavior at one [`TraceInjectionLocation`]
//! - [`TraceGenerator`]: Pure context → snippet rendering
//! - [`LoggingTraceGenerator`]: Structured logger `entering`/`exiting` calls
//! - [`PrintTraceGenerator`]: One console line per call
//!
//! # Example
//!
//! ```rust
//! use tia_codegen::{PrintTraceGenerator, TraceContext, TraceGenerator, TraceInjectionLocation};
//!
//! let ctx = TraceContext {
//!     instrumentation_version: "1.0",
//!     class_name: "acme.Widget",
//!     source_path: "acme/Widget.java",
//!     method_name: "render",
//!     method_signature: "render()",
//!     location: TraceInjectionLocation::Entry,
//! };
//! let snippet = PrintTraceGenerator::default().generate_snippet(&ctx).unwrap();
//! assert!(snippet.contains("Entering acme/Widget.java::acme.Widget::render()"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod error;
pub mod generator;
pub mod location;
pub mod logging;
pub mod print;

// Re-exports
pub use context::TraceContext;
pub use error::CodegenError;
pub use generator::{builtin_factories, string_literal, TraceGenerator, TraceGeneratorFactory};
pub use location::TraceInjectionLocation;
pub use logging::{LoggingTraceFactory, LoggingTraceGenerator, LOGGING_GENERATOR_TYPE};
pub use print::{OutputStream, PrintTraceFactory, PrintTraceGenerator, PRINT_GENERATOR_TYPE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
