//! JSON unit descriptors and the dry-run rewriter over them
//!
//! A [`UnitDescriptor`] is a serde model of a compiled unit. The
//! [`DescriptorRewriter`] parses descriptors instead of bytecode and records
//! insertions in the descriptor's `injections` list, which makes the result
//! of an instrumentation pass inspectable as plain JSON.

use crate::error::RewriteError;
use crate::rewriter::{LoaderScope, ParsedUnit, UnitRewriter};
use crate::unit::{Behavior, BehaviorKind, CompiledUnit, Nesting};
use serde::{Deserialize, Serialize};

/// Serialized form of a [`CompiledUnit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Dotted binary name
    pub name: String,

    /// Nesting; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nesting: Option<Nesting>,

    /// Recorded source file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    /// Ordered behaviors
    #[serde(default)]
    pub behaviors: Vec<BehaviorDescriptor>,

    /// Snippets inserted so far
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub injections: Vec<Injection>,
}

/// Serialized form of a [`Behavior`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorDescriptor {
    /// Runtime name
    pub name: String,

    /// Method or constructor
    #[serde(default)]
    pub kind: BehaviorKind,

    /// Binary parameter type names
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Generic parameter types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_parameters: Option<Vec<String>>,

    /// Abstract flag
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,

    /// Native flag
    #[serde(default, rename = "native", skip_serializing_if = "is_false")]
    pub is_native: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Where a snippet was inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionPosition {
    /// Start of the body
    Before,
    /// Before every normal return
    After,
}

/// One recorded insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injection {
    /// Behavior index within the unit
    pub behavior: usize,
    /// Insertion position
    pub position: InjectionPosition,
    /// Inserted statement text
    pub snippet: String,
    /// Whether the return value is preserved (after-insertions only)
    #[serde(default, skip_serializing_if = "is_false")]
    pub preserve_return: bool,
}

impl UnitDescriptor {
    /// Decode descriptor bytes
    ///
    /// # Errors
    /// Returns [`RewriteError::Descriptor`] if the bytes are not a descriptor
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RewriteError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode descriptor as pretty JSON
    ///
    /// # Errors
    /// Returns [`RewriteError::Descriptor`] if encoding fails
    pub fn to_bytes(&self) -> Result<Vec<u8>, RewriteError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Build the engine's view of this unit
    #[must_use]
    pub fn to_unit(&self) -> CompiledUnit {
        let mut unit = CompiledUnit::new(self.name.clone());
        if let Some(nesting) = self.nesting {
            unit = unit.with_nesting(nesting);
        }
        if let Some(source_file) = &self.source_file {
            unit = unit.with_source_file(source_file.clone());
        }
        for descriptor in &self.behaviors {
            unit.push_behavior(descriptor.to_behavior());
        }
        unit
    }

    /// Injections recorded for one behavior
    pub fn injections_for(&self, behavior: usize) -> impl Iterator<Item = &Injection> {
        self.injections.iter().filter(move |i| i.behavior == behavior)
    }
}

impl From<&CompiledUnit> for UnitDescriptor {
    fn from(unit: &CompiledUnit) -> Self {
        Self {
            name: unit.name().to_string(),
            nesting: Some(unit.nesting()),
            source_file: unit.source_file().map(str::to_string),
            behaviors: unit.behaviors().iter().map(BehaviorDescriptor::from).collect(),
            injections: Vec::new(),
        }
    }
}

impl BehaviorDescriptor {
    /// Build the engine's view of this behavior
    #[must_use]
    pub fn to_behavior(&self) -> Behavior {
        let mut behavior = Behavior::new(self.name.clone(), self.kind)
            .with_parameters(self.parameters.iter().map(String::as_str));
        if let Some(generic) = &self.generic_parameters {
            behavior = behavior.with_generic_parameters(generic.iter().cloned());
        }
        if self.is_abstract {
            behavior = behavior.into_abstract();
        }
        if self.is_native {
            behavior = behavior.into_native();
        }
        behavior
    }
}

impl From<&Behavior> for BehaviorDescriptor {
    fn from(behavior: &Behavior) -> Self {
        Self {
            name: behavior.name().to_string(),
            kind: behavior.kind(),
            parameters: behavior
                .parameter_types()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            generic_parameters: behavior.generic_parameter_types().map(<[String]>::to_vec),
            is_abstract: behavior.is_abstract(),
            is_native: behavior.is_native(),
        }
    }
}

/// Dry-run [`UnitRewriter`] over JSON [`UnitDescriptor`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorRewriter;

impl DescriptorRewriter {
    /// Create rewriter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn record(
        handle: &mut UnitDescriptor,
        behavior: &Behavior,
        position: InjectionPosition,
        snippet: &str,
        preserve_return: bool,
    ) -> Result<(), RewriteError> {
        let Some(target) = handle.behaviors.get(behavior.index()) else {
            return Err(RewriteError::UnknownBehavior {
                unit: handle.name.clone(),
                index: behavior.index(),
            });
        };
        if target.name != behavior.name() {
            return Err(RewriteError::UnknownBehavior {
                unit: handle.name.clone(),
                index: behavior.index(),
            });
        }
        if target.is_abstract || target.is_native {
            return Err(RewriteError::insert(behavior.name(), "behavior has no body"));
        }
        handle.injections.push(Injection {
            behavior: behavior.index(),
            position,
            snippet: snippet.to_string(),
            preserve_return,
        });
        Ok(())
    }
}

impl UnitRewriter for DescriptorRewriter {
    type Handle = UnitDescriptor;

    fn parse(&self, _scope: &LoaderScope, bytes: &[u8]) -> Result<ParsedUnit<Self::Handle>, RewriteError> {
        let descriptor = UnitDescriptor::from_bytes(bytes)?;
        if descriptor.name.trim().is_empty() {
            return Err(RewriteError::Malformed("descriptor has no unit name".to_string()));
        }
        Ok(ParsedUnit::new(descriptor.to_unit(), descriptor))
    }

    fn insert_before(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
    ) -> Result<(), RewriteError> {
        Self::record(handle, behavior, InjectionPosition::Before, snippet, false)
    }

    fn insert_after(
        &self,
        handle: &mut Self::Handle,
        behavior: &Behavior,
        snippet: &str,
        preserve_return: bool,
    ) -> Result<(), RewriteError> {
        Self::record(handle, behavior, InjectionPosition::After, snippet, preserve_return)
    }

    fn serialize(&self, handle: &Self::Handle) -> Result<Vec<u8>, RewriteError> {
        handle.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn widget() -> CompiledUnit {
        CompiledUnit::new("acme.Widget")
            .with_source_file("Widget.java")
            .with_behavior(Behavior::constructor("Widget"))
            .with_behavior(Behavior::method("render").with_parameters(["java.lang.String"]))
            .with_behavior(Behavior::method("draw").into_abstract())
    }

    #[test]
    fn descriptor_preserves_unit_view() {
        let unit = widget();
        let bytes = UnitDescriptor::from(&unit).to_bytes().unwrap();
        let parsed = DescriptorRewriter::new()
            .parse(&LoaderScope::bootstrap(), &bytes)
            .unwrap();
        assert_eq!(parsed.unit, unit);
    }

    #[test]
    fn minimal_descriptor_uses_defaults() {
        let json = br#"{"name":"acme.Widget$Part","behaviors":[{"name":"run"}]}"#;
        let parsed = DescriptorRewriter::new()
            .parse(&LoaderScope::bootstrap(), json)
            .unwrap();
        assert_eq!(parsed.unit.nesting(), Nesting::Inner);
        assert_eq!(parsed.unit.behaviors()[0].kind(), BehaviorKind::Method);
        assert!(parsed.unit.behaviors()[0].parameter_types().is_empty());
    }

    #[test]
    fn insertions_are_recorded_and_serialized() {
        let rewriter = DescriptorRewriter::new();
        let bytes = UnitDescriptor::from(&widget()).to_bytes().unwrap();
        let ParsedUnit { unit, mut handle } = rewriter.parse(&LoaderScope::bootstrap(), &bytes).unwrap();

        let render = &unit.behaviors()[1];
        rewriter.insert_before(&mut handle, render, "enter();").unwrap();
        rewriter.insert_after(&mut handle, render, "exit();", true).unwrap();

        let out = UnitDescriptor::from_bytes(&rewriter.serialize(&handle).unwrap()).unwrap();
        let injections: Vec<&Injection> = out.injections_for(1).collect();
        assert_eq!(injections.len(), 2);
        assert_eq!(injections[0].position, InjectionPosition::Before);
        assert_eq!(injections[1].snippet, "exit();");
        assert!(injections[1].preserve_return);
    }

    #[test]
    fn insertion_into_abstract_behavior_fails() {
        let rewriter = DescriptorRewriter::new();
        let bytes = UnitDescriptor::from(&widget()).to_bytes().unwrap();
        let ParsedUnit { unit, mut handle } = rewriter.parse(&LoaderScope::bootstrap(), &bytes).unwrap();

        let err = rewriter
            .insert_before(&mut handle, &unit.behaviors()[2], "enter();")
            .unwrap_err();
        assert!(matches!(err, RewriteError::Insert { .. }));
    }

    #[test]
    fn foreign_behavior_is_rejected() {
        let rewriter = DescriptorRewriter::new();
        let bytes = UnitDescriptor::from(&widget()).to_bytes().unwrap();
        let ParsedUnit { mut handle, .. } = rewriter.parse(&LoaderScope::bootstrap(), &bytes).unwrap();

        let stranger = CompiledUnit::new("acme.Other")
            .with_behavior(Behavior::method("a"))
            .with_behavior(Behavior::method("b"))
            .with_behavior(Behavior::method("c"))
            .with_behavior(Behavior::method("d"));
        let err = rewriter
            .insert_before(&mut handle, &stranger.behaviors()[3], "x();")
            .unwrap_err();
        assert!(matches!(err, RewriteError::UnknownBehavior { index: 3, .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = DescriptorRewriter::new()
            .parse(&LoaderScope::bootstrap(), &[0xCA, 0xFE, 0xBA, 0xBE])
            .unwrap_err();
        assert!(matches!(err, RewriteError::Descriptor(_)));

        let err = DescriptorRewriter::new()
            .parse(&LoaderScope::bootstrap(), br#"{"name":"  "}"#)
            .unwrap_err();
        assert!(matches!(err, RewriteError::Malformed(_)));
    }
}
