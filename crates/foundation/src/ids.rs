use serde::{Deserialize, Serialize};

/// Canonical metric identifier.
///
/// Hosts pass metric ids around as strings or numbers; every boundary
/// normalizes into this one form so selection comparisons never rely on
/// loose coercion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        MetricId(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this metric's derived trend series is stored.
    pub fn trend_key(&self) -> String {
        format!("{}-trend", self.0)
    }
}

impl From<&str> for MetricId {
    fn from(raw: &str) -> Self {
        MetricId::new(raw)
    }
}

impl From<u64> for MetricId {
    fn from(raw: u64) -> Self {
        MetricId(raw.to_string())
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical map mode identifier (e.g. "us", "us-county", "global").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapModeId(String);

impl MapModeId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        MapModeId(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MapModeId {
    fn from(raw: &str) -> Self {
        MapModeId::new(raw)
    }
}

impl std::fmt::Display for MapModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical feature identifier used to join observation rows to map
/// features. Numeric ids normalize to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        FeatureId(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureId {
    fn from(raw: &str) -> Self {
        FeatureId::new(raw)
    }
}

impl From<u64> for FeatureId {
    fn from(raw: u64) -> Self {
        FeatureId(raw.to_string())
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
