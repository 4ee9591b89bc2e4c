//! Load-time trace injection
//!
//! [`TraceInjector`] is the load hook the agent registers with the host. For
//! every initial load it runs the selection policy, parses the unit, inserts an
//! entry and an exit trace into each accepted behavior and re-serializes the
//! unit:
//!
//! ```text
//! load ─▶ name check ─▶ parse ─▶ unit decision ─▶ per behavior with a body:
//!           │             │          │               decision ─▶ entry ─▶ exit ─▶ insert
//!           ▼             ▼          ▼
//!       unchanged     unchanged   serialized as is
//! ```
//!
//! Failures and panics are contained at the narrowest level that still makes
//! sense: a failing behavior is skipped, a failing parse or serialize leaves the
//! unit unchanged. Nothing propagates to the host.

use crate::error::InjectError;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tia_codegen::{TraceContext, TraceGenerator, TraceInjectionLocation};
use tia_filter::{ApplicationProcessor, ClassProcessor};
use tia_runtime::{
    Behavior, CompiledUnit, LoadEvent, LoadHook, ParsedUnit, UnitRewriter, INTERNAL_SEPARATOR,
    PACKAGE_SEPARATOR,
};
use tracing::Dispatch;

/// What happened to the behaviors of a parsed unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSummary {
    /// Dotted unit name
    pub unit: String,
    /// Whether the policy accepted the unit
    pub accepted: bool,
    /// Signatures of the instrumented behaviors, in insertion order
    pub instrumented: Vec<String>,
    /// Behaviors the policy skipped
    pub skipped: usize,
    /// Behaviors whose instrumentation hit an error or panic
    ///
    /// Such a behavior keeps its entry trace when only the exit insert failed.
    pub failed: usize,
}

impl UnitSummary {
    fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            ..Self::default()
        }
    }
}

/// Result of one load event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Redefinition of an already loaded unit; never rewritten
    Redefinition,
    /// Policy rejected the unit name; the unit was not parsed
    NameRejected,
    /// Rewriter could not parse the unit
    ParseFailed,
    /// Rewriter could not serialize the unit
    SerializeFailed(UnitSummary),
    /// Unit was re-serialized, possibly without changes
    Rewritten {
        /// Serialized unit
        bytes: Vec<u8>,
        /// Behavior outcomes
        summary: UnitSummary,
    },
}

impl InjectionOutcome {
    /// Bytes to hand back to the host, `None` for unchanged
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Rewritten { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Behavior outcomes, once the unit was parsed
    #[must_use]
    pub fn summary(&self) -> Option<&UnitSummary> {
        match self {
            Self::SerializeFailed(summary) | Self::Rewritten { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

/// Presentation shared by all behaviors of one accepted unit
struct UnitSite<'a> {
    version: &'a str,
    class: &'a dyn ClassProcessor,
    class_name: &'a str,
    source_path: &'a str,
}

/// Load hook inserting entry/exit traces
///
/// Holds only immutable state, so one injector serves concurrent loads on any
/// number of threads.
pub struct TraceInjector<R> {
    policy: Box<dyn ApplicationProcessor>,
    generator: Box<dyn TraceGenerator>,
    rewriter: R,
    dispatch: Option<Dispatch>,
}

impl<R> fmt::Debug for TraceInjector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceInjector")
            .field("policy", &self.policy)
            .field("generator", &self.generator)
            .field("dispatch", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: UnitRewriter> TraceInjector<R> {
    /// Create injector
    #[must_use]
    pub fn new(
        policy: Box<dyn ApplicationProcessor>,
        generator: Box<dyn TraceGenerator>,
        rewriter: R,
    ) -> Self {
        Self {
            policy,
            generator,
            rewriter,
            dispatch: None,
        }
    }

    /// Emit diagnostics to `dispatch` instead of the caller's default
    #[inline]
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Selection policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &dyn ApplicationProcessor {
        self.policy.as_ref()
    }

    /// Rewriter
    #[inline]
    #[must_use]
    pub fn rewriter(&self) -> &R {
        &self.rewriter
    }

    /// Handle one load event
    pub fn process(&self, event: &LoadEvent<'_>) -> InjectionOutcome {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || self.process_event(event)),
            None => self.process_event(event),
        }
    }

    fn process_event(&self, event: &LoadEvent<'_>) -> InjectionOutcome {
        if event.redefinition {
            return InjectionOutcome::Redefinition;
        }
        match guard(|| self.policy.accept_unit_name(event.unit_name)) {
            Ok(true) => {}
            Ok(false) => return InjectionOutcome::NameRejected,
            Err(panic) => {
                tracing::error!(unit = %dotted(event.unit_name), %panic, "selection policy panicked on unit name");
                return InjectionOutcome::NameRejected;
            }
        }

        let unit_name = dotted(event.unit_name);
        tracing::debug!(unit = %unit_name, scope = %event.scope, "injecting entry/exit trace into unit");
        let ParsedUnit { unit, mut handle } = match guard(|| self.rewriter.parse(event.scope, event.bytes)) {
            Ok(Ok(parsed)) => parsed,
            Ok(Err(err)) => {
                tracing::error!(unit = %unit_name, error = %err, "failed to parse unit");
                return InjectionOutcome::ParseFailed;
            }
            Err(panic) => {
                tracing::error!(unit = %unit_name, %panic, "rewriter panicked while parsing unit");
                return InjectionOutcome::ParseFailed;
            }
        };

        let summary = self.instrument_unit(&unit, &mut handle);
        let serialized = guard(|| self.rewriter.serialize(&handle));
        if let Err(panic) = guard(move || self.rewriter.release(handle)) {
            tracing::warn!(unit = %unit, %panic, "rewriter panicked while releasing unit");
        }

        match serialized {
            Ok(Ok(bytes)) => {
                tracing::debug!(
                    unit = %unit,
                    instrumented = summary.instrumented.len(),
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "unit rewritten"
                );
                InjectionOutcome::Rewritten { bytes, summary }
            }
            Ok(Err(err)) => {
                tracing::error!(unit = %unit, error = %err, "failed to serialize unit");
                InjectionOutcome::SerializeFailed(summary)
            }
            Err(panic) => {
                tracing::error!(unit = %unit, %panic, "rewriter panicked while serializing unit");
                InjectionOutcome::SerializeFailed(summary)
            }
        }
    }

    fn instrument_unit(&self, unit: &CompiledUnit, handle: &mut R::Handle) -> UnitSummary {
        let mut summary = UnitSummary::new(unit.name());
        if let Err(panic) = guard(|| self.instrument_accepted(unit, handle, &mut summary)) {
            tracing::error!(unit = %unit, %panic, "selection policy panicked on unit");
        }
        summary
    }

    fn instrument_accepted(&self, unit: &CompiledUnit, handle: &mut R::Handle, summary: &mut UnitSummary) {
        let Some(class) = self.policy.accept_unit(unit) else {
            tracing::debug!(unit = %unit, "unit rejected by selection policy");
            return;
        };
        summary.accepted = true;

        let class_name: Cow<'_, str> = class.class_name();
        let source_path: Cow<'_, str> = class.source_path();
        let site = UnitSite {
            version: self.policy.instrumentation_version(),
            class: class.as_ref(),
            class_name: &class_name,
            source_path: &source_path,
        };

        // constructors first, then methods
        let behaviors = unit.behaviors();
        let ordered = behaviors
            .iter()
            .filter(|b| b.is_constructor())
            .chain(behaviors.iter().filter(|b| !b.is_constructor()));

        for behavior in ordered.filter(|b| b.has_body()) {
            match guard(|| self.instrument_behavior(&site, behavior, handle)) {
                Ok(Ok(Some(signature))) => summary.instrumented.push(signature),
                Ok(Ok(None)) => summary.skipped += 1,
                Ok(Err(err)) => {
                    tracing::error!(
                        unit = %site.class_name,
                        behavior = %behavior.name(),
                        error = %err,
                        "failed to inject trace into behavior"
                    );
                    summary.failed += 1;
                }
                Err(panic) => {
                    tracing::error!(
                        unit = %site.class_name,
                        behavior = %behavior.name(),
                        %panic,
                        "panic while injecting trace into behavior"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    fn instrument_behavior(
        &self,
        site: &UnitSite<'_>,
        behavior: &Behavior,
        handle: &mut R::Handle,
    ) -> Result<Option<String>, InjectError> {
        let Some(method) = site.class.accept_behavior(behavior) else {
            tracing::trace!(unit = %site.class_name, behavior = %behavior, "behavior rejected by selection policy");
            return Ok(None);
        };
        let entry_ctx = TraceContext {
            instrumentation_version: site.version,
            class_name: site.class_name,
            source_path: site.source_path,
            method_name: method.method_name(),
            method_signature: method.method_signature(),
            location: TraceInjectionLocation::Entry,
        };
        let exit_ctx = entry_ctx.at(TraceInjectionLocation::Exit);
        let entry = self.generator.generate_snippet(&entry_ctx)?;
        let exit = self.generator.generate_snippet(&exit_ctx)?;

        tracing::debug!(
            unit = %site.class_name,
            signature = %method.method_signature(),
            "injecting entry/exit trace into behavior"
        );
        tracing::trace!(signature = %method.method_signature(), location = %entry_ctx.location, snippet = %entry);
        tracing::trace!(signature = %method.method_signature(), location = %exit_ctx.location, snippet = %exit);

        self.rewriter.insert_before(handle, behavior, &entry)?;
        if let Err(err) = self.rewriter.insert_after(handle, behavior, &exit, true) {
            tracing::warn!(
                unit = %site.class_name,
                signature = %method.method_signature(),
                "entry trace already inserted; behavior has no exit trace"
            );
            return Err(err.into());
        }
        Ok(Some(method.method_signature().to_string()))
    }
}

impl<R: UnitRewriter> LoadHook for TraceInjector<R> {
    fn on_load(&self, event: &LoadEvent<'_>) -> Option<Vec<u8>> {
        self.process(event).into_bytes()
    }
}

fn dotted(unit_name: &str) -> String {
    unit_name.replace(INTERNAL_SEPARATOR, &PACKAGE_SEPARATOR.to_string())
}

/// Run `f`, turning a panic into its message
fn guard<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
