//! Compiler option bag.
//!
//! The build driver owns the meaning of compiler options; this layer only
//! carries them around, layers overrides on top of them and reads the handful
//! of output-location keys it needs. Keys use the tsconfig spelling
//! (`outDir`, `rootDir`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerOptions(Map<String, Value>);

impl CompilerOptions {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build from a JSON value. Anything other than an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Shallow merge: every top-level key of `other` overwrites the same key
    /// in `self`. Nested objects are replaced, not merged.
    pub fn merge(&mut self, other: &CompilerOptions) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn merged(mut self, other: &CompilerOptions) -> Self {
        self.merge(other);
        self
    }

    pub fn out_dir(&self) -> Option<&str> {
        self.get_str("outDir")
    }

    pub fn root_dir(&self) -> Option<&str> {
        self.get_str("rootDir")
    }

    pub fn declaration(&self) -> bool {
        self.get_bool("declaration").unwrap_or(false)
    }

    pub fn source_map(&self) -> bool {
        self.get_bool("sourceMap").unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for CompilerOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
