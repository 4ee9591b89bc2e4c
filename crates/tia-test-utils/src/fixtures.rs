//! Compiled unit fixtures
//!
//! Mirrors a small `example` package: a top-level class, an anonymous class,
//! an inner class, a generic class with a local class, and an unrelated
//! `other` package.

use std::path::{Path, PathBuf};
use tia_runtime::{Behavior, CompiledUnit, UnitDescriptor};

pub const CONFIG_FILE_NAME: &str = "instrumenter-config.json";

pub fn example_unit() -> CompiledUnit {
    CompiledUnit::new("example.Example")
        .with_source_file("Example.java")
        .with_behavior(Behavior::constructor("Example"))
        .with_behavior(Behavior::method("describe").with_parameters(["java.lang.String", "int"]))
        .with_behavior(
            Behavior::method("lookup")
                .with_parameters(["java.util.Map"])
                .with_generic_parameters(["java.util.Map<java.lang.String, java.lang.Integer>"]),
        )
        .with_behavior(Behavior::method("hidden").with_parameters(["long"]))
}

pub fn anonymous_unit() -> CompiledUnit {
    CompiledUnit::new("example.Example$1")
        .with_source_file("Example.java")
        .with_behavior(Behavior::constructor("Example$1").with_parameters(["example.Example"]))
        .with_behavior(Behavior::method("run"))
}

pub fn another_unit() -> CompiledUnit {
    CompiledUnit::new("example.Example$Another")
        .with_source_file("Example.java")
        .with_behavior(Behavior::constructor("Example$Another").with_parameters(["example.Example"]))
        .with_behavior(Behavior::method("greet").with_parameters(["java.lang.String"]))
}

pub fn generic_unit() -> CompiledUnit {
    CompiledUnit::new("example.Generic")
        .with_source_file("Generic.java")
        .with_behavior(
            Behavior::method("put")
                .with_parameters(["java.lang.Object", "java.lang.Object"])
                .with_generic_parameters(["K", "V"]),
        )
        .with_behavior(
            Behavior::method("get")
                .with_parameters(["java.lang.Object"])
                .with_generic_parameters(["K"]),
        )
}

pub fn generic_point_unit() -> CompiledUnit {
    CompiledUnit::new("example.Generic$1Point")
        .with_source_file("Generic.java")
        .with_behavior(
            Behavior::constructor("Generic$1Point")
                .with_parameters(["example.Generic", "java.lang.Object", "java.lang.Object"])
                .with_generic_parameters(["example.Generic", "T", "T"]),
        )
}

pub fn example_units() -> Vec<CompiledUnit> {
    vec![
        example_unit(),
        anonymous_unit(),
        another_unit(),
        generic_unit(),
        generic_point_unit(),
    ]
}

pub fn other_unit() -> CompiledUnit {
    CompiledUnit::new("other.Other")
        .with_source_file("Other.java")
        .with_behavior(Behavior::method("run"))
}

/// One concrete `render()` and one abstract `outline()`
pub fn shape_unit() -> CompiledUnit {
    CompiledUnit::new("acme.Shape")
        .with_source_file("Shape.java")
        .with_behavior(Behavior::method("render"))
        .with_behavior(Behavior::method("outline").into_abstract())
}

/// Three concrete behaviors: `first()`, `second()`, `third()`
pub fn triple_unit() -> CompiledUnit {
    CompiledUnit::new("acme.Triple")
        .with_behavior(Behavior::method("first"))
        .with_behavior(Behavior::method("second"))
        .with_behavior(Behavior::method("third"))
}

pub fn descriptor_bytes(unit: &CompiledUnit) -> Vec<u8> {
    UnitDescriptor::from(unit).to_bytes().unwrap()
}

pub fn decode(bytes: &[u8]) -> UnitDescriptor {
    UnitDescriptor::from_bytes(bytes).unwrap()
}

/// Write `config` as the agent configuration file of `dir`
pub fn write_config(dir: &Path, config: &serde_json::Value) -> PathBuf {
    let path = dir.join(CONFIG_FILE_NAME);
    std::fs::write(&path, serde_json::to_vec_pretty(config).unwrap()).unwrap();
    path
}
