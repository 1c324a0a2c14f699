use std::cell::RefCell;
use std::rc::Rc;

use catalog::source::SeriesBatch;
use foundation::filters::FilterSet;

/// Session-owned cache for the expensive unfiltered policy pull.
///
/// Invalidation rule: the cached batch only describes the unfiltered
/// universe, so it is cleared whenever the active filter set is non-empty.
/// Owned by the refresh session and passed by reference; never a process
/// global.
#[derive(Debug, Default)]
pub struct PolicyCache {
    slot: RefCell<Option<Rc<SeriesBatch>>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, batch: SeriesBatch) -> Rc<SeriesBatch> {
        let shared = Rc::new(batch);
        *self.slot.borrow_mut() = Some(shared.clone());
        shared
    }

    pub fn get(&self) -> Option<Rc<SeriesBatch>> {
        self.slot.borrow().clone()
    }

    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// Apply the invalidation rule for the given view filters.
    pub fn invalidate_for(&self, filters: &FilterSet) {
        if !filters.is_empty() {
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PolicyCache;
    use catalog::source::SeriesBatch;
    use foundation::filters::FilterSet;

    #[test]
    fn non_empty_filters_clear_the_cache() {
        let cache = PolicyCache::new();
        cache.store(SeriesBatch::values(Vec::new()));

        cache.invalidate_for(&FilterSet::new());
        assert!(cache.get().is_some());

        let mut filters = FilterSet::new();
        filters.insert("primary_ph_measure", vec!["Social distancing".into()]);
        cache.invalidate_for(&filters);
        assert!(cache.get().is_none());
    }
}
