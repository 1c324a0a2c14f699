use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDate;
use foundation::date::DayRange;
use foundation::filters::FilterSet;
use foundation::ids::MapModeId;
use scene::store::FeatureQuery;
use serde::{Deserialize, Serialize};

/// Which administrative level policy queries resolve to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyResolution {
    #[default]
    Geo,
    SubGeo,
}

/// Query parameter object: ordered string keys over JSON leaves, merged and
/// extended as descriptors are assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    entries: BTreeMap<String, serde_json::Value>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Attach the refresh window as `start_date` / `end_date`.
    pub fn with_day_range(mut self, range: DayRange) -> Self {
        self.set("start_date", range.start_string());
        self.set("end_date", range.end_string());
        self
    }

    /// Attach only the window end, as trend sub-queries address it.
    pub fn with_end(mut self, range: DayRange) -> Self {
        self.set("end", range.end_string());
        self
    }

    /// Numeric `metric_id` parameter, when the metric carries one.
    pub fn metric_id(&self) -> Option<u64> {
        self.entries.get("metric_id").and_then(|v| v.as_u64())
    }
}

/// Context handed to parameter resolvers.
pub struct ResolveCtx<'a> {
    pub date: NaiveDate,
    pub map_mode: &'a MapModeId,
    pub filters: &'a FilterSet,
    pub policy_resolution: PolicyResolution,
    pub map: Option<&'a dyn FeatureQuery>,
}

/// A parameter resolver refused to produce a descriptor. This aborts the
/// refresh cycle; the previous data object stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamError {
    pub message: String,
}

impl ParamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parameter resolution failed: {}", self.message)
    }
}

impl std::error::Error for ParamError {}

pub type ParamFn = dyn Fn(&ResolveCtx<'_>) -> Result<QueryParams, ParamError>;

/// How a metric's query parameters are produced: a fixed object, or a
/// resolver run against the current view. Resolution is always explicit;
/// nothing is decided by inspecting the shape at run time.
#[derive(Clone)]
pub enum Params {
    Static(QueryParams),
    Resolved(Rc<ParamFn>),
}

impl Params {
    pub fn resolve(&self, ctx: &ResolveCtx<'_>) -> Result<QueryParams, ParamError> {
        match self {
            Params::Static(params) => {
                let mut params = params.clone();
                params.set("map_id", ctx.map_mode.as_str());
                Ok(params)
            }
            Params::Resolved(resolver) => resolver(ctx),
        }
    }
}

impl std::fmt::Debug for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Params::Static(params) => f.debug_tuple("Static").field(params).finish(),
            Params::Resolved(_) => f.write_str("Resolved(..)"),
        }
    }
}
