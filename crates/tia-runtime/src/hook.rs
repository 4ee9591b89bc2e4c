//! Host runtime load-time interception boundary

use crate::rewriter::LoaderScope;

/// One unit-load notification from the host runtime
#[derive(Debug, Clone, Copy)]
pub struct LoadEvent<'a> {
    /// Loader scope the unit is loaded in
    pub scope: &'a LoaderScope,
    /// Internal unit name (`acme/Widget$Part`)
    pub unit_name: &'a str,
    /// Raw unit bytes
    pub bytes: &'a [u8],
    /// Set when an already-loaded unit is being redefined or retransformed
    pub redefinition: bool,
}

impl<'a> LoadEvent<'a> {
    /// Event for a unit's first load
    #[inline]
    #[must_use]
    pub fn initial(scope: &'a LoaderScope, unit_name: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            scope,
            unit_name,
            bytes,
            redefinition: false,
        }
    }

    /// Event for the redefinition of a loaded unit
    #[inline]
    #[must_use]
    pub fn redefinition(scope: &'a LoaderScope, unit_name: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            scope,
            unit_name,
            bytes,
            redefinition: true,
        }
    }
}

/// Load-time transformer registered with the host
///
/// Returns the rewritten bytes, or `None` to leave the unit unchanged. Must
/// never fail: the host always receives one of the two.
pub trait LoadHook: Send + Sync {
    /// Called once per unit load
    fn on_load(&self, event: &LoadEvent<'_>) -> Option<Vec<u8>>;
}

/// Registration surface of the host runtime
pub trait HostHooks {
    /// Register a load hook
    fn add_hook(&mut self, hook: Box<dyn LoadHook>);
}

/// In-process host: runs registered hooks in registration order
///
/// Each hook sees the bytes produced by the previous one.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn LoadHook>>,
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("hook_count", &self.hooks.len())
            .finish()
    }
}

impl HookChain {
    /// Create empty chain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Number of registered hooks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hook is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run all hooks over one load
    ///
    /// Returns `None` when no hook changed the unit.
    #[must_use]
    pub fn dispatch(&self, scope: &LoaderScope, unit_name: &str, bytes: &[u8]) -> Option<Vec<u8>> {
        let mut current: Option<Vec<u8>> = None;
        for hook in &self.hooks {
            let input = current.as_deref().unwrap_or(bytes);
            if let Some(rewritten) = hook.on_load(&LoadEvent::initial(scope, unit_name, input)) {
                current = Some(rewritten);
            }
        }
        current
    }
}

impl HostHooks for HookChain {
    fn add_hook(&mut self, hook: Box<dyn LoadHook>) {
        self.hooks.push(hook);
    }
}
