use catalog::registry::ModeCatalog;
use layers::binder::bind_feature_states;
use scene::store::{FeatureQuery, FeatureStateStore};
use streaming::getter::{GetterError, GetterInput, fetch_query_results};

use crate::session::{CycleOutcome, SyncSession};
use crate::view::ViewParams;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { updated: usize, reused: usize },
    Superseded,
}

#[derive(Debug)]
pub enum RefreshError {
    Getter(GetterError),
}

impl std::fmt::Display for RefreshError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshError::Getter(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for RefreshError {}

impl From<GetterError> for RefreshError {
    fn from(error: GetterError) -> Self {
        RefreshError::Getter(error)
    }
}

/// One full selection-change cycle: diff, fetch, merge, bind.
///
/// The bind only runs for cycles that are still the latest at merge time;
/// a superseded cycle leaves both the data object and feature state alone.
pub async fn refresh<S: FeatureStateStore>(
    session: &mut SyncSession,
    catalog: &ModeCatalog,
    view: &ViewParams,
    store: &mut S,
) -> Result<RefreshOutcome, RefreshError> {
    let ticket = session.begin(&catalog.metrics, view);
    let updated = ticket.plan.update.len();
    let reused = ticket.plan.reuse.len();

    let fetched = {
        let probe: &dyn FeatureQuery = &*store;
        fetch_query_results(GetterInput {
            date: view.date,
            filters: &view.filters,
            metrics_to_update: &ticket.plan.update,
            map_mode: &view.map_mode,
            policy_resolution: view.policy_resolution,
            map: Some(probe),
            trend_source: &catalog.trend_source,
            cache: session.cache(),
        })
        .await?
    };

    match session.finish(&ticket, fetched) {
        CycleOutcome::Stale => Ok(RefreshOutcome::Superseded),
        CycleOutcome::Fresh(data) => {
            bind_feature_states(store, catalog, data);
            Ok(RefreshOutcome::Applied { updated, reused })
        }
    }
}
