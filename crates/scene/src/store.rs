use std::collections::BTreeMap;

use foundation::feature::{GeoSource, PropertyFilter};
use foundation::ids::FeatureId;
use foundation::value::Value;

use crate::state::StatePatch;

/// Read side of the rendering layer: which features are currently rendered
/// for a geometry source, optionally narrowed by a property filter.
pub trait FeatureQuery {
    fn rendered_features(
        &self,
        source: &GeoSource,
        filter: Option<&PropertyFilter>,
    ) -> Vec<FeatureId>;
}

/// Write side of the rendering layer: merge a state patch onto one feature.
///
/// Both operations address features by `{source, layer, id}` only; this is
/// the entire surface the binder is allowed to touch.
pub trait FeatureStateStore: FeatureQuery {
    fn set_feature_state(&mut self, source: &GeoSource, feature: &FeatureId, patch: &StatePatch);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct FeatureEntry {
    rendered: bool,
    properties: BTreeMap<String, String>,
    state: BTreeMap<String, Value>,
}

/// In-memory feature-state store.
///
/// Stands in for the rendering layer in tests and headless hosts. Matching
/// the real thing, state may be set for ids that were never rendered (it is
/// plain keyed storage), but `rendered_features` only reports features that
/// were explicitly added.
#[derive(Debug, Default)]
pub struct InMemoryFeatureState {
    sources: BTreeMap<GeoSource, BTreeMap<FeatureId, FeatureEntry>>,
}

impl InMemoryFeatureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(
        &mut self,
        source: &GeoSource,
        id: impl Into<FeatureId>,
        properties: Vec<(String, String)>,
    ) {
        let entry = self
            .sources
            .entry(source.clone())
            .or_default()
            .entry(id.into())
            .or_default();
        entry.rendered = true;
        entry.properties = properties.into_iter().collect();
    }

    pub fn state(&self, source: &GeoSource, id: &FeatureId) -> Option<&BTreeMap<String, Value>> {
        self.sources
            .get(source)
            .and_then(|features| features.get(id))
            .map(|entry| &entry.state)
    }

    pub fn state_value(&self, source: &GeoSource, id: &FeatureId, key: &str) -> Option<&Value> {
        self.state(source, id).and_then(|state| state.get(key))
    }
}

impl FeatureQuery for InMemoryFeatureState {
    fn rendered_features(
        &self,
        source: &GeoSource,
        filter: Option<&PropertyFilter>,
    ) -> Vec<FeatureId> {
        let Some(features) = self.sources.get(source) else {
            return Vec::new();
        };
        features
            .iter()
            .filter(|(_, entry)| entry.rendered)
            .filter(|(_, entry)| filter.is_none_or(|f| f.matches(&entry.properties)))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl FeatureStateStore for InMemoryFeatureState {
    fn set_feature_state(&mut self, source: &GeoSource, feature: &FeatureId, patch: &StatePatch) {
        let entry = self
            .sources
            .entry(source.clone())
            .or_default()
            .entry(feature.clone())
            .or_default();
        for (key, value) in patch.entries() {
            entry.state.insert(key.to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureQuery, FeatureStateStore, InMemoryFeatureState};
    use crate::state::StatePatch;
    use foundation::feature::{GeoSource, PropertyFilter};
    use foundation::ids::FeatureId;
    use foundation::value::Value;
    use pretty_assertions::assert_eq;

    fn src() -> GeoSource {
        GeoSource::new("us-states")
    }

    #[test]
    fn patches_merge_keywise() {
        let mut store = InMemoryFeatureState::new();
        store.add_feature(&src(), "36", vec![]);

        let id = FeatureId::from("36");
        let mut first = StatePatch::new();
        first.set("74", 10.0).set("nodata", false);
        store.set_feature_state(&src(), &id, &first);

        let mut second = StatePatch::new();
        second.set("74", Value::Null);
        store.set_feature_state(&src(), &id, &second);

        assert_eq!(store.state_value(&src(), &id, "74"), Some(&Value::Null));
        // Untouched keys survive the second patch.
        assert_eq!(
            store.state_value(&src(), &id, "nodata"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn rendered_features_respects_property_filters() {
        let mut store = InMemoryFeatureState::new();
        store.add_feature(&src(), "36", vec![("type".into(), "state".into())]);
        store.add_feature(&src(), "12065", vec![("type".into(), "county".into())]);

        let filter = PropertyFilter::eq("type", "state");
        let hits = store.rendered_features(&src(), Some(&filter));
        assert_eq!(hits, vec![FeatureId::from("36")]);

        let all = store.rendered_features(&src(), None);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn state_for_unrendered_ids_is_stored_but_not_reported() {
        let mut store = InMemoryFeatureState::new();
        let ghost = FeatureId::from("99");
        let mut patch = StatePatch::new();
        patch.set("74", 1.0);
        store.set_feature_state(&src(), &ghost, &patch);

        assert!(store.rendered_features(&src(), None).is_empty());
        assert_eq!(
            store.state_value(&src(), &ghost, "74"),
            Some(&Value::Number(1.0))
        );
    }
}
