//! TIA Core
//!
//! Load-time injection of entry/exit traces into compiled units.
//!
//! # Core Concepts
//!
//! - [`TraceInjector`]: The load hook; runs the selection policy and the trace
//!   generator over every loaded unit and rewrites the accepted behaviors
//! - [`Agent`]: Bootstrap; turns the agent argument into a configured injector
//! - [`FactoryRegistry`]: Explicit `(type, version)` registries of plugin factories
//! - [`AgentConfig`] / [`LoggingConfig`]: The JSON configuration document
//!
//! # Example
//!
//! ```rust
//! use tia_codegen::PrintTraceGenerator;
//! use tia_core::{InjectionOutcome, TraceInjector};
//! use tia_filter::PrefixPolicy;
//! use tia_runtime::{Behavior, CompiledUnit, DescriptorRewriter, LoadEvent, LoaderScope, UnitDescriptor};
//!
//! let injector = TraceInjector::new(
//!     Box::new(PrefixPolicy::new(["acme"])),
//!     Box::new(PrintTraceGenerator::default()),
//!     DescriptorRewriter,
//! );
//!
//! let unit = CompiledUnit::new("acme.Widget").with_behavior(Behavior::method("render"));
//! let bytes = UnitDescriptor::from(&unit).to_bytes().unwrap();
//! let scope = LoaderScope::bootstrap();
//!
//! let outcome = injector.process(&LoadEvent::initial(&scope, "acme/Widget", &bytes));
//! assert_eq!(outcome.summary().unwrap().instrumented, ["render()"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod agent;
pub mod config;
pub mod error;
pub mod injector;
pub mod logging;
pub mod registry;

// Re-exports
pub use agent::{Agent, AttachReport};
pub use config::{AgentConfig, PluginSection, DEFAULT_CONFIG_FILE_NAME};
pub use error::{ConfigError, InjectError, PluginCategory};
pub use injector::{InjectionOutcome, TraceInjector, UnitSummary};
pub use logging::LoggingConfig;
pub use registry::{FactoryRegistry, FilterRegistry, GeneratorRegistry, PluginId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
