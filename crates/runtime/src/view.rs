use catalog::params::PolicyResolution;
use chrono::NaiveDate;
use foundation::filters::FilterSet;
use foundation::ids::{MapModeId, MetricId};

/// The user's current selection tuple.
///
/// At most one metric is active per rendering role. Ids arrive already
/// normalized by their newtypes, so comparisons here are exact.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub map_mode: MapModeId,
    pub date: NaiveDate,
    pub filters: FilterSet,
    pub fill: Option<MetricId>,
    pub circle: Option<MetricId>,
    pub policy_resolution: PolicyResolution,
}

impl ViewParams {
    pub fn new(map_mode: impl Into<MapModeId>, date: NaiveDate) -> Self {
        Self {
            map_mode: map_mode.into(),
            date,
            filters: FilterSet::new(),
            fill: None,
            circle: None,
            policy_resolution: PolicyResolution::default(),
        }
    }

    pub fn with_fill(mut self, id: impl Into<MetricId>) -> Self {
        self.fill = Some(id.into());
        self
    }

    pub fn with_circle(mut self, id: impl Into<MetricId>) -> Self {
        self.circle = Some(id.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }
}

/// Which selection axes moved between two view snapshots.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ViewDelta {
    pub mode_changed: bool,
    pub date_changed: bool,
    pub filters_changed: bool,
    pub fill_changed: bool,
    pub circle_changed: bool,
}

impl ViewDelta {
    pub fn between(current: &ViewParams, previous: &ViewParams) -> Self {
        Self {
            mode_changed: current.map_mode != previous.map_mode,
            date_changed: current.date != previous.date,
            filters_changed: !current.filters.same_as(&previous.filters),
            fill_changed: current.fill != previous.fill,
            circle_changed: current.circle != previous.circle,
        }
    }

    /// None of the in-mode selection axes moved (mode is judged separately).
    pub fn all_unchanged(&self) -> bool {
        !(self.date_changed || self.filters_changed || self.fill_changed || self.circle_changed)
    }
}
