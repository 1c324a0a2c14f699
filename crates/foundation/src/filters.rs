use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::date::DayRange;

/// Filter key carrying the refresh date window injected by the query builder.
pub const DATES_IN_EFFECT: &str = "dates_in_effect";

/// The active filter selections, keyed by filter field.
///
/// Keys iterate in a stable order so the serialized form is canonical and
/// two sets compare equal exactly when their serialized forms do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    /// True when no filter carries any selected value.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|v| v.is_empty())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns a copy with the `dates_in_effect` window attached. The
    /// receiver is never mutated; callers keep their own set untouched.
    pub fn with_dates_in_effect(&self, range: DayRange) -> FilterSet {
        let mut augmented = self.clone();
        augmented.insert(
            DATES_IN_EFFECT,
            vec![range.start_string(), range.end_string()],
        );
        augmented
    }

    /// Canonical serialized form used for deep-equality diffing.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_default()
    }

    pub fn same_as(&self, other: &FilterSet) -> bool {
        self.canonical_json() == other.canonical_json()
    }
}

#[cfg(test)]
mod tests {
    use super::{DATES_IN_EFFECT, FilterSet};
    use crate::date::DayRange;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn augmentation_does_not_mutate_the_source_set() {
        let mut filters = FilterSet::new();
        filters.insert("primary_ph_measure", vec!["Social distancing".into()]);

        let augmented = filters.with_dates_in_effect(DayRange::single(day(2021, 3, 1)));

        assert!(filters.get(DATES_IN_EFFECT).is_none());
        assert_eq!(
            augmented.get(DATES_IN_EFFECT),
            Some(&["2021-03-01".to_string(), "2021-03-01".to_string()][..])
        );
    }

    #[test]
    fn serialized_comparison_is_order_insensitive() {
        let mut a = FilterSet::new();
        a.insert("b", vec!["2".into()]);
        a.insert("a", vec!["1".into()]);

        let mut b = FilterSet::new();
        b.insert("a", vec!["1".into()]);
        b.insert("b", vec!["2".into()]);

        assert!(a.same_as(&b));

        b.insert("a", vec!["3".into()]);
        assert!(!a.same_as(&b));
    }

    #[test]
    fn empty_means_no_selected_values() {
        let mut filters = FilterSet::new();
        assert!(filters.is_empty());
        filters.insert("jurisdiction", Vec::new());
        assert!(filters.is_empty());
        filters.insert("jurisdiction", vec!["state".into()]);
        assert!(!filters.is_empty());
    }
}
