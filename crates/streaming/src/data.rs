use std::collections::BTreeMap;

use catalog::source::SeriesBatch;
use foundation::ids::MetricId;

/// The unified per-metric data behind one render generation.
///
/// Keys are metric ids plus `"<id>-trend"` for derived trend series. A base
/// series and its trend series always travel together: reuse adoption copies
/// both, extrema side channels included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataObject {
    entries: BTreeMap<String, SeriesBatch>,
}

impl DataObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fetched(fetched: BTreeMap<String, SeriesBatch>) -> Self {
        Self { entries: fetched }
    }

    pub fn insert(&mut self, key: impl Into<String>, batch: SeriesBatch) {
        self.entries.insert(key.into(), batch);
    }

    pub fn get(&self, key: &str) -> Option<&SeriesBatch> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Carry a reused metric's entries over from the prior object.
    pub fn adopt_reused(&mut self, prior: &DataObject, metric_id: &MetricId) {
        if let Some(batch) = prior.get(metric_id.as_str()) {
            self.entries
                .insert(metric_id.as_str().to_string(), batch.clone());
        }
        let trend_key = metric_id.trend_key();
        if let Some(batch) = prior.get(&trend_key) {
            self.entries.insert(trend_key, batch.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DataObject;
    use catalog::source::SeriesBatch;
    use foundation::ids::MetricId;
    use foundation::observation::Observation;
    use pretty_assertions::assert_eq;

    #[test]
    fn adoption_copies_base_trend_and_extrema() {
        let mut prior = DataObject::new();
        let batch = SeriesBatch::values(vec![Observation::new("36", 10.0)]).with_extrema(
            Observation::unlinked(0.0),
            Observation::unlinked(99.0),
        );
        prior.insert("74", batch.clone());
        prior.insert("74-trend", SeriesBatch::trends(Vec::new()));
        prior.insert("other", SeriesBatch::values(Vec::new()));

        let mut merged = DataObject::new();
        merged.adopt_reused(&prior, &MetricId::from(74));

        assert_eq!(merged.get("74"), Some(&batch));
        assert!(merged.contains("74-trend"));
        assert!(!merged.contains("other"));
    }
}
