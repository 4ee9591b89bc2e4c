//! Symbol and reference table documents
//!
//! Both tables are JSON documents produced by an external source analyzer.
//! Object key order is significant (argument lists are ordered objects), so
//! maps are [`IndexMap`]s.
//!
//! Parsing is strict about the document and lenient about its entries: a
//! file that is not a JSON object fails to load, while an entry of the wrong
//! shape is dropped or read as absent without affecting its siblings. Scalar
//! fields (`file`, `Type`, `signature`, `Version`) accept strings, numbers
//! and booleans as text.

use crate::error::TableError;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the symbol table inside a table directory
pub const SYMBOL_TABLE_FILE_NAME: &str = "symTable.json";

/// File name of the reference table inside a table directory
pub const REFERENCE_TABLE_FILE_NAME: &str = "refTable.json";

/// Argument entry of a function-list record
///
/// An argument without a scalar `Type` matches no parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArgumentEntry {
    /// Declared type as written in source (`Map<K, V>`)
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
}

impl ArgumentEntry {
    fn from_value(value: &Value) -> Self {
        Self {
            declared_type: value.get("Type").and_then(scalar_text),
        }
    }
}

impl<'de> Deserialize<'de> for ArgumentEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

/// Function-list record for one method name or overload key
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunctionEntry {
    /// Ordered arguments: name → declared type; `None` unless `Args` is an object
    #[serde(rename = "Args", skip_serializing_if = "Option::is_none")]
    pub args: Option<IndexMap<String, ArgumentEntry>>,

    /// Canonical signature of this function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl FunctionEntry {
    fn from_object(object: &Map<String, Value>) -> Self {
        let args: Option<IndexMap<String, ArgumentEntry>> =
            object.get("Args").and_then(Value::as_object).map(|args| {
                args.iter()
                    .map(|(name, arg)| (name.clone(), ArgumentEntry::from_value(arg)))
                    .collect()
            });
        Self {
            args,
            signature: object.get("signature").and_then(scalar_text),
        }
    }

    /// Create entry from ordered `(argument, type)` pairs
    #[must_use]
    pub fn with_args<I, N, T>(args: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            args: Some(
                args.into_iter()
                    .map(|(name, ty)| {
                        (
                            name.into(),
                            ArgumentEntry {
                                declared_type: Some(ty.into()),
                            },
                        )
                    })
                    .collect(),
            ),
            signature: None,
        }
    }

    /// Set canonical signature
    #[inline]
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

impl<'de> Deserialize<'de> for FunctionEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| de::Error::custom("function entry must be an object"))?;
        Ok(Self::from_object(object))
    }
}

/// Symbol-table record for one class-level symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolEntry {
    /// Source file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Canonical signatures; present only in tables produced by a full source parser
    ///
    /// A `funcSig` key holding anything but an object (`null` included) still
    /// marks the entry as parser-produced, with no signatures listed.
    #[serde(rename = "funcSig", skip_serializing_if = "Option::is_none")]
    pub func_sig: Option<IndexMap<String, Value>>,

    /// Function list keyed by method name or overload key; non-object records are dropped
    #[serde(rename = "funcL", skip_serializing_if = "Option::is_none")]
    pub func_list: Option<IndexMap<String, FunctionEntry>>,
}

impl SymbolEntry {
    fn from_object(object: &Map<String, Value>) -> Self {
        let func_sig: Option<IndexMap<String, Value>> = object.get("funcSig").map(|sigs| {
            sigs.as_object()
                .map(|sigs| sigs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default()
        });
        let func_list: Option<IndexMap<String, FunctionEntry>> = object.get("funcL").and_then(Value::as_object).map(|list| {
            list.iter()
                .filter_map(|(key, function)| {
                    let function = function.as_object()?;
                    Some((key.clone(), FunctionEntry::from_object(function)))
                })
                .collect()
        });
        Self {
            file: object.get("file").and_then(scalar_text),
            func_sig,
            func_list,
        }
    }

    /// Check if the entry carries canonical signatures
    #[inline]
    #[must_use]
    pub fn has_canonical_signatures(&self) -> bool {
        self.func_sig.is_some()
    }

    /// Check if `signature` is a canonical signature of this entry
    #[must_use]
    pub fn has_canonical_signature(&self, signature: &str) -> bool {
        self.func_sig
            .as_ref()
            .is_some_and(|sigs| sigs.contains_key(signature))
    }

    /// Function-list record by exact key
    #[must_use]
    pub fn function(&self, key: &str) -> Option<&FunctionEntry> {
        self.func_list.as_ref().and_then(|list| list.get(key))
    }

    /// All function-list records, in document order
    pub fn functions(&self) -> impl Iterator<Item = (&str, &FunctionEntry)> {
        self.func_list
            .iter()
            .flat_map(|list| list.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl<'de> Deserialize<'de> for SymbolEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| de::Error::custom("symbol entry must be an object"))?;
        Ok(Self::from_object(object))
    }
}

/// Symbol table: symbol key → [`SymbolEntry`]
///
/// Entries that are not objects are skipped on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: IndexMap<String, SymbolEntry>,
}

impl<'de> Deserialize<'de> for SymbolTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            match value.as_object() {
                Some(object) => {
                    entries.insert(key, SymbolEntry::from_object(object));
                }
                None => tracing::debug!(key = %key, "skipping symbol entry that is not an object"),
            }
        }
        Ok(Self { entries })
    }
}

impl SymbolTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load table from a JSON file
    ///
    /// # Errors
    /// Returns [`TableError`] if the file is missing, unreadable or malformed
    pub fn load(path: &Path) -> Result<Self, TableError> {
        read_document(path)
    }

    /// Insert entry
    pub fn insert(&mut self, key: impl Into<String>, entry: SymbolEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Entry by symbol key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SymbolEntry> {
        self.entries.get(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reference table: class name → candidate symbol keys
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTable {
    /// Dotted class name (nested units as `.$`) → candidate symbol keys
    ///
    /// A listed class whose value is not an array of scalar keys keeps its
    /// listing with the scalar prefix of the array as candidates (often none).
    #[serde(rename = "FQCN")]
    pub fqcn: IndexMap<String, Vec<String>>,

    /// Instrumentation version tag
    #[serde(rename = "Version", skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

impl<'de> Deserialize<'de> for ReferenceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let fqcn = raw
            .get("FQCN")
            .and_then(Value::as_object)
            .map(|classes| {
                classes
                    .iter()
                    .map(|(class, keys)| (class.clone(), candidate_keys(keys)))
                    .collect()
            })
            .unwrap_or_default();
        let version = raw.get("Version").filter(|v| !v.is_null()).cloned();
        Ok(Self { fqcn, version })
    }
}

impl ReferenceTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load table from a JSON file
    ///
    /// # Errors
    /// Returns [`TableError`] if the file is missing, unreadable or malformed
    pub fn load(path: &Path) -> Result<Self, TableError> {
        read_document(path)
    }

    /// Set version tag
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(Value::String(version.into()));
        self
    }

    /// Add class with its candidate keys
    #[must_use]
    pub fn with_class<I, K>(mut self, fqcn: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.fqcn
            .insert(fqcn.into(), keys.into_iter().map(Into::into).collect());
        self
    }

    /// Check if the class key is listed
    #[inline]
    #[must_use]
    pub fn contains(&self, fqcn: &str) -> bool {
        self.fqcn.contains_key(fqcn)
    }

    /// Candidate symbol keys for a class key
    #[inline]
    #[must_use]
    pub fn candidates(&self, fqcn: &str) -> Option<&[String]> {
        self.fqcn.get(fqcn).map(Vec::as_slice)
    }

    /// Version tag as text; JSON strings, numbers and booleans qualify
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.version.as_ref().and_then(scalar_text)
    }
}

/// Symbol and reference tables of one table directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    /// Symbol table
    pub symbols: SymbolTable,
    /// Reference table
    pub references: ReferenceTable,
}

impl TableSet {
    /// Create table set
    #[inline]
    #[must_use]
    pub fn new(symbols: SymbolTable, references: ReferenceTable) -> Self {
        Self {
            symbols,
            references,
        }
    }

    /// Load both tables from a directory
    ///
    /// # Errors
    /// Returns the first [`TableError`] of either table
    pub fn load(dir: &Path) -> Result<Self, TableError> {
        let symbols = SymbolTable::load(&dir.join(SYMBOL_TABLE_FILE_NAME))?;
        let references = ReferenceTable::load(&dir.join(REFERENCE_TABLE_FILE_NAME))?;
        tracing::debug!(
            dir = %dir.display(),
            symbols = symbols.len(),
            classes = references.fqcn.len(),
            "loaded symbol and reference tables"
        );
        Ok(Self::new(symbols, references))
    }

    /// Resolve a class key to its first candidate symbol
    ///
    /// Only the head of the candidate list is consulted.
    #[must_use]
    pub fn first_candidate(&self, fqcn: &str) -> Option<(&str, &SymbolEntry)> {
        let key = self.references.candidates(fqcn)?.first()?;
        self.symbols.get(key).map(|entry| (key.as_str(), entry))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn candidate_keys(keys: &Value) -> Vec<String> {
    keys.as_array()
        .map(|keys| keys.iter().map_while(scalar_text).collect())
        .unwrap_or_default()
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    if !path.exists() {
        return Err(TableError::Missing(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| TableError::io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| TableError::syntax_error(path, e))
}
