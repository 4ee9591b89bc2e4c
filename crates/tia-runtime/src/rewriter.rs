//! External unit-rewriting collaborator
//!
//! The engine never touches raw unit bytes itself. Parsing, statement
//! insertion and re-serialization are delegated to a [`UnitRewriter`].

use crate::error::RewriteError;
use crate::unit::{Behavior, CompiledUnit};
use std::fmt::{self, Display, Formatter};

/// Class-loader scope a unit is being loaded in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LoaderScope {
    name: Option<String>,
}

impl LoaderScope {
    /// The runtime's bootstrap scope
    #[inline]
    #[must_use]
    pub fn bootstrap() -> Self {
        Self { name: None }
    }

    /// A named loader scope
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Scope name, `None` for bootstrap
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for LoaderScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or("bootstrap"))
    }
}

/// A unit produced by [`UnitRewriter::parse`]
///
/// `unit` is the engine's read-only view; `handle` is the rewriter's own
/// representation that insertions are applied to.
#[derive(Debug)]
pub struct ParsedUnit<H> {
    /// Read-only view of the unit
    pub unit: CompiledUnit,
    /// Rewriter-owned representation
    pub handle: H,
}

impl<H> ParsedUnit<H> {
    /// Create parsed unit
    #[inline]
    #[must_use]
    pub fn new(unit: CompiledUnit, handle: H) -> Self {
        Self { unit, handle }
    }
}

/// Parses, rewrites and re-serializes compiled units
///
/// Implementations must be safe to share across the threads the host runtime
/// loads units on. Each handle is used by exactly one load event.
pub trait UnitRewriter: Send + Sync {
    /// Rewriter-owned unit representation
    type Handle;

    /// Parse raw unit bytes loaded in `scope`
    fn parse(&self, scope: &LoaderScope, bytes: &[u8]) -> Result<ParsedUnit<Self::Handle>, RewriteError>;

    /// Insert `snippet` at the start of the behavior's body
    fn insert_before(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
    ) -> Result<(), RewriteError>;

    /// Insert `snippet` before every normal return of the behavior
    ///
    /// With `preserve_return` the returned value survives the inserted code.
    fn insert_after(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
        preserve_return: bool,
    ) -> Result<(), RewriteError>;

    /// Write the (possibly rewritten) unit back to bytes
    fn serialize(&self, handle: &Self::Handle) -> Result<Vec<u8>, RewriteError>;

    /// Release resources held for the unit
    fn release(&self, handle: Self::Handle) {
        drop(handle);
    }
}
