use std::collections::BTreeMap;

use foundation::value::Value;
use serde::{Deserialize, Serialize};

/// Key under which the "no data" flag is written alongside metric values.
pub const NODATA_KEY: &str = "nodata";

/// A partial feature-state update.
///
/// Patches merge key-wise into a feature's existing state: keys present in
/// the patch overwrite, keys absent are left alone. This mirrors the
/// rendering layer's per-feature state semantics, so a clear patch must name
/// every key it wants nulled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePatch {
    entries: BTreeMap<String, Value>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
