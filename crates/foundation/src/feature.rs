use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property comparison operators for feature filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyOp {
    Eq,
    Contains,
}

/// Restricts which rendered features a metric paints, matched against the
/// feature's property map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub key: String,
    pub op: PropertyOp,
    pub value: String,
}

impl PropertyFilter {
    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: PropertyOp::Eq,
            value: value.into(),
        }
    }

    pub fn matches(&self, properties: &BTreeMap<String, String>) -> bool {
        let Some(v) = properties.get(&self.key) else {
            return false;
        };
        match self.op {
            PropertyOp::Eq => v == &self.value,
            PropertyOp::Contains => v.contains(&self.value),
        }
    }
}

/// A geometry source the rendering layer draws from.
///
/// A map mode may register several (e.g. separate circle sources per zoom
/// tier); observation state is written to each of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeoSource {
    pub id: String,
    pub layer: Option<String>,
}

impl GeoSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer: None,
        }
    }

    pub fn with_layer(id: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer: Some(layer.into()),
        }
    }
}
