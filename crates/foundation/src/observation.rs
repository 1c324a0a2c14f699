use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::FeatureId;
use crate::value::Value;

/// A single observation row returned by a data series query.
///
/// `link` carries the value of the metric's feature-link field; rows whose
/// backend place has no geometry counterpart arrive with `link: None` and
/// are skipped at bind time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub link: Option<FeatureId>,
    pub value: Value,
    pub date: Option<NaiveDate>,
    pub place_name: Option<String>,
}

impl Observation {
    pub fn new(link: impl Into<FeatureId>, value: impl Into<Value>) -> Self {
        Self {
            link: Some(link.into()),
            value: value.into(),
            date: None,
            place_name: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn unlinked(value: impl Into<Value>) -> Self {
        Self {
            link: None,
            value: value.into(),
            date: None,
            place_name: None,
        }
    }
}

/// A trend row: the base metric's value at the start and end of a fixed
/// window, joined to observations by place id and end date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendObservation {
    pub place: FeatureId,
    pub start_obs: f64,
    pub end_obs: f64,
    pub end_date: NaiveDate,
}

impl TrendObservation {
    pub fn new(
        place: impl Into<FeatureId>,
        start_obs: f64,
        end_obs: f64,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            place: place.into(),
            start_obs,
            end_obs,
            end_date,
        }
    }
}
