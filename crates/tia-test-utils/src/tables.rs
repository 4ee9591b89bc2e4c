//! Symbol and reference table fixtures
//!
//! Parser tables carry canonical signatures (`funcSig`) as produced by a full
//! source parser; keyed tables only carry function lists.

use serde_json::{json, Value};
use std::io;
use std::path::Path;

pub const ANOTHER_SYMBOL_KEY: &str = "Example.java#Another";

pub fn parser_symbol_table() -> Value {
    json!({
        "sym:example.Example": {
            "file": "src/example/Example.java",
            "funcSig": {
                "Example()": {},
                "describe(String name, int count)": {},
                "lookup(Map<String, Integer> index)": {}
            },
            "funcL": {
                "Example": { "Args": {}, "signature": "Example()" },
                "describe": {
                    "Args": { "name": { "Type": "String" }, "count": { "Type": "int" } },
                    "signature": "describe(String name, int count)"
                },
                "lookup": {
                    "Args": { "index": { "Type": "Map<String, Integer>" } },
                    "signature": "lookup(Map<String, Integer> index)"
                }
            }
        },
        "sym:example.Generic": {
            "file": "src/example/Generic.java",
            "funcSig": { "put(K key, V value)": {}, "get(K key)": {} },
            "funcL": {
                "put": {
                    "Args": { "key": { "Type": "K" }, "value": { "Type": "V" } },
                    "signature": "put(K key, V value)"
                },
                "get": {
                    "Args": { "key": { "Type": "K" } },
                    "signature": "get(K key)"
                }
            }
        },
        "sym:example.Generic.$1Point": {
            "file": "src/example/Generic.java",
            "funcSig": { "Point(T x, T y)": {} },
            "funcL": {
                "1Point": {
                    "Args": { "x": { "Type": "T" }, "y": { "Type": "T" } },
                    "signature": "Point(T x, T y)"
                }
            }
        }
    })
}

pub fn parser_reference_table() -> Value {
    json!({
        "FQCN": {
            "example.Example": ["sym:example.Example"],
            "example.Generic": ["sym:example.Generic"],
            "example.Generic.$1Point": ["sym:example.Generic.$1Point"]
        },
        "Version": "2.0"
    })
}

pub fn keyed_symbol_table() -> Value {
    let entry = json!({
        "file": "Example.java",
        "funcL": {
            "Another": { "Args": {} },
            "greet": { "Args": {} },
            "greet [overloaded_1]": { "Args": { "name": { "Type": "String" } } }
        }
    });
    let mut table = serde_json::Map::new();
    table.insert(ANOTHER_SYMBOL_KEY.to_string(), entry);
    Value::Object(table)
}

pub fn keyed_reference_table() -> Value {
    json!({
        "FQCN": { "example.Example.$Another": [ANOTHER_SYMBOL_KEY] }
    })
}

pub fn write_tables(dir: &Path, symbols: &Value, references: &Value) -> io::Result<()> {
    std::fs::write(dir.join("symTable.json"), serde_json::to_vec_pretty(symbols)?)?;
    std::fs::write(dir.join("refTable.json"), serde_json::to_vec_pretty(references)?)
}

pub fn write_parser_tables(dir: &Path) -> io::Result<()> {
    write_tables(dir, &parser_symbol_table(), &parser_reference_table())
}

pub fn write_keyed_tables(dir: &Path) -> io::Result<()> {
    write_tables(dir, &keyed_symbol_table(), &keyed_reference_table())
}
