//! TIA Selection Policies
//!
//! Decide which loaded units and behaviors receive trace calls, and how each is
//! presented in the trace (class name, source path, method name, signature).
//!
//! # Core Concepts
//!
//! - [`ApplicationProcessor`]: Unit-name pre-check and unit decision
//! - [`ClassProcessor`]: Unit presentation and behavior decision
//! - [`MethodProcessor`]: Behavior presentation
//! - [`PrefixPolicy`]: Accepts units under configured packages
//! - [`CorrelationPolicy`]: Accepts units listed in symbol/reference tables
//!
//! # Example
//!
//! ```rust
//! use tia_filter::{ApplicationProcessor, PrefixPolicy};
//! use tia_runtime::{Behavior, CompiledUnit};
//!
//! let policy = PrefixPolicy::new(["acme"]);
//! assert!(policy.accept_unit_name("acme/Widget"));
//!
//! let unit = CompiledUnit::new("acme.Widget")
//!     .with_behavior(Behavior::method("resize").with_parameters(["int", "int"]));
//! let class = policy.accept_unit(&unit).unwrap();
//! let method = class.accept_behavior(&unit.behaviors()[0]).unwrap();
//! assert_eq!(method.method_signature(), "resize(int, int)");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod correlation;
pub mod factory;
pub mod prefix;
pub mod processor;

// Re-exports
pub use correlation::{
    resolve_signature, CorrelationClassDecision, CorrelationPolicy, TableFilterFactory,
    TABLE_FILTER_TYPE,
};
pub use factory::{builtin_factories, ApplicationProcessorFactory};
pub use prefix::{PackageFilterFactory, PrefixClassDecision, PrefixPolicy, PACKAGE_FILTER_TYPE};
pub use processor::{
    default_signature, generic_parameter_types, method_name, parameter_types, ApplicationProcessor,
    ClassProcessor, MethodProcessor, ResolvedMethod, DEFAULT_INSTRUMENTATION_VERSION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
