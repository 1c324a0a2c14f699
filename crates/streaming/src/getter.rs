use std::collections::BTreeMap;
use std::rc::Rc;

use catalog::metric::Metric;
use catalog::params::{ParamError, PolicyResolution, ResolveCtx};
use catalog::source::{QueryPlan, SeriesBatch, SeriesSource};
use chrono::NaiveDate;
use foundation::date::DayRange;
use foundation::filters::FilterSet;
use foundation::ids::{MapModeId, MetricId};
use scene::store::FeatureQuery;

use crate::cache::PolicyCache;
use crate::executor::{ExecutorError, execute};

#[derive(Debug)]
pub enum GetterError {
    Params { metric: MetricId, error: ParamError },
    Executor(ExecutorError),
}

impl std::fmt::Display for GetterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetterError::Params { metric, error } => {
                write!(f, "metric '{metric}': {error}")
            }
            GetterError::Executor(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for GetterError {}

impl From<ExecutorError> for GetterError {
    fn from(error: ExecutorError) -> Self {
        GetterError::Executor(error)
    }
}

/// Everything one fetch pass needs from the refresh cycle.
pub struct GetterInput<'a> {
    pub date: NaiveDate,
    pub filters: &'a FilterSet,
    pub metrics_to_update: &'a [Metric],
    pub map_mode: &'a MapModeId,
    pub policy_resolution: PolicyResolution,
    pub map: Option<&'a dyn FeatureQuery>,
    pub trend_source: &'a Rc<dyn SeriesSource>,
    pub cache: &'a PolicyCache,
}

/// Translate the update set into query descriptors and run them.
///
/// The refresh window is the selected day (`start == end`); filters are
/// augmented with `dates_in_effect` without touching the caller's set.
/// Misconfigured metrics are logged and skipped so one bad entry does not
/// block the rest; a failing parameter resolver aborts the whole pass.
pub async fn fetch_query_results(
    input: GetterInput<'_>,
) -> Result<BTreeMap<String, SeriesBatch>, GetterError> {
    let range = DayRange::single(input.date);
    let augmented = input.filters.with_dates_in_effect(range);
    input.cache.invalidate_for(input.filters);

    let ctx = ResolveCtx {
        date: input.date,
        map_mode: input.map_mode,
        filters: &augmented,
        policy_resolution: input.policy_resolution,
        map: input.map,
    };

    let mut plans: BTreeMap<String, QueryPlan<'_>> = BTreeMap::new();
    for metric in input.metrics_to_update {
        let key = metric.id.as_str().to_string();
        // Both roles may point at the same metric; one query per pass.
        if plans.contains_key(&key) {
            continue;
        }

        let params = metric
            .params
            .resolve(&ctx)
            .map_err(|error| GetterError::Params {
                metric: metric.id.clone(),
                error,
            })?;

        if metric.has_fill_role() && metric.styles.fill.is_none() {
            log::warn!(
                "metric '{}' has a fill role but no fill style; skipping its query",
                metric.id
            );
            continue;
        }
        if metric.source.requires_filters() && !params.contains("filters") {
            log::warn!(
                "metric '{}' requires a filters argument but none was resolved; skipping its query",
                metric.id
            );
            continue;
        }

        if metric.trend {
            if let Some(numeric_id) = params.metric_id() {
                let trend_key = MetricId::from(numeric_id).trend_key();
                let trend_params = params.clone().with_end(range);
                plans.insert(trend_key, input.trend_source.plan(trend_params));
            }
        }

        let descriptor = params.with_day_range(range);
        plans.insert(key, metric.source.plan(descriptor));
    }

    log::debug!(
        "submitting {} queries for {}",
        plans.len(),
        range.start_string()
    );
    Ok(execute(plans).await?)
}
