//! TIA Symbol Tables
//!
//! Externally produced metadata that correlates a compiled unit's runtime
//! identity with source-level facts.
//!
//! # Overview
//!
//! - **SymbolTable**: opaque symbol key → source file, canonical signatures, function list
//! - **ReferenceTable**: fully qualified class name → candidate symbol keys, plus a version tag
//! - **TableSet**: both tables loaded from one directory
//!
//! # Example
//!
//! ```rust
//! use tia_symbol::{fqcn_key, raw_type};
//!
//! assert_eq!(fqcn_key("example/Example$Another"), "example.Example.$Another");
//! assert_eq!(raw_type("Map<K, V>"), "Map");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod signature;
pub mod table;

// Re-exports
pub use error::TableError;
pub use signature::{fqcn_key, is_overload_key, overload_prefix, raw_type, OVERLOAD_MARKER};
pub use table::{
    ArgumentEntry, FunctionEntry, ReferenceTable, SymbolEntry, SymbolTable, TableSet,
    REFERENCE_TABLE_FILE_NAME, SYMBOL_TABLE_FILE_NAME,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
