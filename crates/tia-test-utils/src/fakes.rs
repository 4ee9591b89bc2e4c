//! Test doubles for the rewriter and generator seams

use parking_lot::Mutex;
use std::sync::Arc;
use tia_codegen::{
    CodegenError, PrintTraceGenerator, TraceContext, TraceGenerator, TraceInjectionLocation,
};
use tia_runtime::{
    Behavior, DescriptorRewriter, LoaderScope, ParsedUnit, RewriteError, UnitDescriptor,
    UnitRewriter,
};

/// One call a [`FaultyRewriter`] completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteCall {
    Parse(String),
    InsertBefore(String),
    InsertAfter { behavior: String, preserve_return: bool },
    Serialize(String),
    Release(String),
}

/// Shared, clonable call log
#[derive(Debug, Clone, Default)]
pub struct RewriteLog(Arc<Mutex<Vec<RewriteCall>>>);

impl RewriteLog {
    fn push(&self, call: RewriteCall) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<RewriteCall> {
        self.0.lock().clone()
    }

    pub fn parses(&self) -> usize {
        self.count(|c| matches!(c, RewriteCall::Parse(_)))
    }

    pub fn insertions(&self) -> usize {
        self.count(|c| matches!(c, RewriteCall::InsertBefore(_) | RewriteCall::InsertAfter { .. }))
    }

    pub fn releases(&self) -> usize {
        self.count(|c| matches!(c, RewriteCall::Release(_)))
    }

    pub fn count(&self, pred: impl Fn(&RewriteCall) -> bool) -> usize {
        self.0.lock().iter().filter(|c| pred(c)).count()
    }
}

/// [`DescriptorRewriter`] with injectable parse, insert and serialize faults
#[derive(Debug, Clone, Default)]
pub struct FaultyRewriter {
    inner: DescriptorRewriter,
    fail_parse: bool,
    fail_serialize: bool,
    failing_insert: Option<String>,
    failing_insert_after: Option<String>,
    panicking_insert: Option<String>,
    log: RewriteLog,
}

impl FaultyRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_parse(mut self) -> Self {
        self.fail_parse = true;
        self
    }

    #[must_use]
    pub fn failing_serialize(mut self) -> Self {
        self.fail_serialize = true;
        self
    }

    /// Inserts into the named behavior return an error
    #[must_use]
    pub fn failing_insert(mut self, behavior: &str) -> Self {
        self.failing_insert = Some(behavior.to_string());
        self
    }

    /// Exit inserts into the named behavior return an error; entry inserts succeed
    #[must_use]
    pub fn failing_insert_after(mut self, behavior: &str) -> Self {
        self.failing_insert_after = Some(behavior.to_string());
        self
    }

    /// Inserts into the named behavior panic
    #[must_use]
    pub fn panicking_insert(mut self, behavior: &str) -> Self {
        self.panicking_insert = Some(behavior.to_string());
        self
    }

    pub fn log(&self) -> RewriteLog {
        self.log.clone()
    }

    fn check_insert(&self, behavior: &Behavior) -> Result<(), RewriteError> {
        if self.panicking_insert.as_deref() == Some(behavior.name()) {
            panic!("rewriter exploded in {}", behavior.name());
        }
        if self.failing_insert.as_deref() == Some(behavior.name()) {
            return Err(RewriteError::insert(behavior.name(), "injected insert fault"));
        }
        Ok(())
    }
}

impl UnitRewriter for FaultyRewriter {
    type Handle = UnitDescriptor;

    fn parse(&self, scope: &LoaderScope, bytes: &[u8]) -> Result<ParsedUnit<Self::Handle>, RewriteError> {
        if self.fail_parse {
            return Err(RewriteError::Malformed("injected parse fault".to_string()));
        }
        let parsed = self.inner.parse(scope, bytes)?;
        self.log.push(RewriteCall::Parse(parsed.unit.name().to_string()));
        Ok(parsed)
    }

    fn insert_before(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
    ) -> Result<(), RewriteError> {
        self.check_insert(behavior)?;
        self.inner.insert_before(handle, behavior, snippet)?;
        self.log.push(RewriteCall::InsertBefore(behavior.name().to_string()));
        Ok(())
    }

    fn insert_after(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
        preserve_return: bool,
    ) -> Result<(), RewriteError> {
        self.check_insert(behavior)?;
        if self.failing_insert_after.as_deref() == Some(behavior.name()) {
            return Err(RewriteError::insert(behavior.name(), "injected exit insert fault"));
        }
        self.inner.insert_after(handle, behavior, snippet, preserve_return)?;
        self.log.push(RewriteCall::InsertAfter {
            behavior: behavior.name().to_string(),
            preserve_return,
        });
        Ok(())
    }

    fn serialize(&self, handle: &Self::Handle) -> Result<Vec<u8>, RewriteError> {
        if self.fail_serialize {
            return Err(RewriteError::Serialize("injected serialize fault".to_string()));
        }
        let bytes = self.inner.serialize(handle)?;
        self.log.push(RewriteCall::Serialize(handle.name.clone()));
        Ok(bytes)
    }

    fn release(&self, handle: Self::Handle) {
        self.log.push(RewriteCall::Release(handle.name.clone()));
    }
}

/// Owned copy of a [`TraceContext`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedContext {
    pub instrumentation_version: String,
    pub class_name: String,
    pub source_path: String,
    pub method_name: String,
    pub method_signature: String,
    pub location: TraceInjectionLocation,
}

impl From<&TraceContext<'_>> for RecordedContext {
    fn from(ctx: &TraceContext<'_>) -> Self {
        Self {
            instrumentation_version: ctx.instrumentation_version.to_string(),
            class_name: ctx.class_name.to_string(),
            source_path: ctx.source_path.to_string(),
            method_name: ctx.method_name.to_string(),
            method_signature: ctx.method_signature.to_string(),
            location: ctx.location,
        }
    }
}

/// Generator recording every context it renders
///
/// Snippets read `trace("<Label> <class>::<signature>");`. Clones share the
/// record.
#[derive(Debug, Clone, Default)]
pub struct RecordingGenerator {
    records: Arc<Mutex<Vec<RecordedContext>>>,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RecordedContext> {
        self.records.lock().clone()
    }

    pub fn snippet_for(location: TraceInjectionLocation, class_name: &str, signature: &str) -> String {
        format!("trace(\"{} {class_name}::{signature}\");", location.print_name())
    }
}

impl TraceGenerator for RecordingGenerator {
    fn generate_snippet(&self, ctx: &TraceContext<'_>) -> Result<String, CodegenError> {
        self.records.lock().push(RecordedContext::from(ctx));
        Ok(Self::snippet_for(ctx.location, ctx.class_name, ctx.method_signature))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Error,
    Panic,
}

/// Generator that fails for one method name and delegates otherwise
#[derive(Debug)]
pub struct FailingGenerator {
    inner: Box<dyn TraceGenerator>,
    method_name: String,
    failure: Failure,
}

impl FailingGenerator {
    /// Returns an error for `method_name`
    pub fn erroring(method_name: &str) -> Self {
        Self {
            inner: Box::new(PrintTraceGenerator::default()),
            method_name: method_name.to_string(),
            failure: Failure::Error,
        }
    }

    /// Panics for `method_name`
    pub fn panicking(method_name: &str) -> Self {
        Self {
            failure: Failure::Panic,
            ..Self::erroring(method_name)
        }
    }

    #[must_use]
    pub fn with_inner(mut self, inner: impl TraceGenerator + 'static) -> Self {
        self.inner = Box::new(inner);
        self
    }
}

impl TraceGenerator for FailingGenerator {
    fn generate_snippet(&self, ctx: &TraceContext<'_>) -> Result<String, CodegenError> {
        if ctx.method_name == self.method_name {
            match self.failure {
                Failure::Error => {
                    return Err(CodegenError::generator(format!("no snippet for {}", ctx.method_name)))
                }
                Failure::Panic => panic!("generator exploded in {}", ctx.method_name),
            }
        }
        self.inner.generate_snippet(ctx)
    }
}
