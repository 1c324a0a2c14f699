use catalog::registry::ModeCatalog;
use catalog::source::SeriesRows;
use foundation::observation::{Observation, TrendObservation};
use foundation::value::Value;
use scene::state::{NODATA_KEY, StatePatch};
use scene::store::FeatureStateStore;
use streaming::data::DataObject;

use crate::trend::percent_delta;

/// Push the data object onto the rendering layer's per-feature state.
///
/// Runs in two passes. The reset pass nulls every declared metric (and its
/// trend key) on all rendered features matching the metric's filter, across
/// every geometry source of the mode, so features absent from the new data
/// end in an explicit "no data" state. The apply pass then writes values and
/// trend deltas for every observation that links to a feature.
pub fn bind_feature_states(
    store: &mut dyn FeatureStateStore,
    catalog: &ModeCatalog,
    data: &DataObject,
) {
    clear_declared_state(store, catalog);

    for metric in &catalog.metrics {
        let Some(batch) = data.get(metric.id.as_str()) else {
            // Not fetched this cycle: the metric is not currently visible.
            continue;
        };
        let rows = match &batch.rows {
            SeriesRows::Values(rows) => rows,
            SeriesRows::Trends(_) => {
                log::warn!(
                    "series '{}' holds trend rows where observations were expected; not bound",
                    metric.id
                );
                continue;
            }
        };

        let trend_rows = if metric.trend {
            data.get(&metric.id.trend_key())
                .and_then(|trend_batch| trend_batch.trend_rows())
        } else {
            None
        };

        let mut bound = 0usize;
        for obs in rows {
            // Geocoding gaps between backend places and map features are
            // expected; rows without a link value are skipped.
            let Some(link) = &obs.link else {
                continue;
            };

            let patch = observation_patch(metric.id.as_str(), obs, trend_rows);
            for source in &catalog.geo_sources {
                store.set_feature_state(source, link, &patch);
            }
            bound += 1;
        }
        log::debug!("bound {} features for metric '{}'", bound, metric.id);
    }
}

fn clear_declared_state(store: &mut dyn FeatureStateStore, catalog: &ModeCatalog) {
    for metric in &catalog.metrics {
        let mut cleared = StatePatch::new();
        cleared.set(metric.id.as_str(), Value::Null);
        cleared.set(metric.id.trend_key(), Value::Null);

        for source in &catalog.geo_sources {
            for feature in store.rendered_features(source, metric.filter.as_ref()) {
                store.set_feature_state(source, &feature, &cleared);
            }
        }
    }
}

fn observation_patch(
    metric_key: &str,
    obs: &Observation,
    trend_rows: Option<&[TrendObservation]>,
) -> StatePatch {
    let mut patch = StatePatch::new();
    if obs.value.is_null() {
        patch.set(NODATA_KEY, true);
        patch.set(metric_key, Value::Null);
    } else {
        patch.set(NODATA_KEY, false);
        patch.set(metric_key, obs.value.clone());
    }

    if let Some(trend) = trend_rows.and_then(|rows| matching_trend(obs, rows)) {
        patch.set(
            format!("{metric_key}-trend"),
            percent_delta(trend.start_obs, trend.end_obs),
        );
    }
    patch
}

/// Trend rows join on place id and window end date.
fn matching_trend<'a>(
    obs: &Observation,
    rows: &'a [TrendObservation],
) -> Option<&'a TrendObservation> {
    let link = obs.link.as_ref()?;
    let date = obs.date?;
    rows.iter()
        .find(|trend| &trend.place == link && trend.end_date == date)
}
