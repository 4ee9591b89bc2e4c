//! TIA Runtime Boundary
//!
//! The model of everything the trace injection engine sees of the managed
//! runtime it instruments.
//!
//! # Core Concepts
//!
//! - [`CompiledUnit`]: A parsed program unit (class) with its ordered [`Behavior`]s
//! - [`UnitRewriter`]: The external parse / insert / serialize collaborator
//! - [`LoadHook`] / [`HostHooks`]: The host runtime's load-time interception boundary
//! - [`PathResolver`]: Resolves plugin paths against the agent configuration file
//! - [`DescriptorRewriter`]: A dry-run rewriter over JSON unit descriptors
//! - [`TypedFactory`]: The `(type, version)` contract of every plugin factory
//!
//! # Example
//!
//! ```rust
//! use tia_runtime::{Behavior, CompiledUnit, TypeName};
//!
//! let unit = CompiledUnit::new("acme.Widget")
//!     .with_behavior(Behavior::method("render"))
//!     .with_behavior(Behavior::method("resize").with_parameters([TypeName::new("int")]));
//!
//! assert_eq!(unit.internal_name(), "acme/Widget");
//! assert_eq!(unit.behaviors().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod hook;
pub mod path;
pub mod plugin;
pub mod rewriter;
pub mod unit;

// Re-exports
pub use descriptor::{BehaviorDescriptor, DescriptorRewriter, Injection, InjectionPosition, UnitDescriptor};
pub use error::RewriteError;
pub use hook::{HookChain, HostHooks, LoadEvent, LoadHook};
pub use path::PathResolver;
pub use plugin::{PluginError, TypedFactory, DEFAULT_PLUGIN_VERSION};
pub use rewriter::{LoaderScope, ParsedUnit, UnitRewriter};
pub use unit::{
    Behavior, BehaviorKind, CompiledUnit, Nesting, TypeName, DEFAULT_SOURCE_EXTENSION,
    INTERNAL_SEPARATOR, NESTED_SEPARATOR, PACKAGE_SEPARATOR,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
