use std::collections::BTreeMap;

use catalog::metric::Metric;
use catalog::source::SeriesBatch;
use streaming::cache::PolicyCache;
use streaming::data::DataObject;

use crate::diff::{UpdatePlan, select_metrics};
use crate::view::ViewParams;

/// Handle for one refresh cycle, issued by `begin` and redeemed by `finish`.
#[derive(Debug)]
pub struct CycleTicket {
    pub generation: u64,
    pub plan: UpdatePlan,
}

/// What happened to a finished cycle's results.
#[derive(Debug)]
pub enum CycleOutcome<'a> {
    /// The merge was applied; this is now the authoritative data object.
    Fresh(&'a DataObject),
    /// A newer cycle began while this one was in flight; nothing changed.
    Stale,
}

/// Owner of the refresh state: the previous view snapshot, the authoritative
/// data object, the cycle generation counter and the policy cache.
///
/// Overlapping cycles are legal: each `begin` bumps the generation, and
/// `finish` only swaps results in for the latest generation. A slow earlier
/// cycle can therefore never overwrite a faster later one; until some cycle
/// finishes fresh, the old data object stays authoritative.
#[derive(Default)]
pub struct SyncSession {
    generation: u64,
    prev_view: Option<ViewParams>,
    data: Option<DataObject>,
    cache: PolicyCache,
}

impl SyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&DataObject> {
        self.data.as_ref()
    }

    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a cycle: diff against the previous view and snapshot the
    /// current one for the next diff.
    pub fn begin(&mut self, metrics: &[Metric], view: &ViewParams) -> CycleTicket {
        self.generation += 1;
        let plan = select_metrics(metrics, view, self.prev_view.as_ref(), self.data.is_some());
        self.prev_view = Some(view.clone());
        CycleTicket {
            generation: self.generation,
            plan,
        }
    }

    /// Merge fetched results with the reuse set and swap the union in.
    ///
    /// The swap is a single assignment: readers only ever observe the old
    /// object or the completed union, never a partial merge.
    pub fn finish(
        &mut self,
        ticket: &CycleTicket,
        fetched: BTreeMap<String, SeriesBatch>,
    ) -> CycleOutcome<'_> {
        if ticket.generation != self.generation {
            log::debug!(
                "cycle {} superseded by {}; dropping its results",
                ticket.generation,
                self.generation
            );
            return CycleOutcome::Stale;
        }

        let mut merged = DataObject::from_fetched(fetched);
        if let Some(prior) = &self.data {
            for metric in &ticket.plan.reuse {
                merged.adopt_reused(prior, &metric.id);
            }
        }
        CycleOutcome::Fresh(&*self.data.insert(merged))
    }
}
