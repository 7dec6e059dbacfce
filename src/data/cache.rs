use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;

use super::model::Observation;
use super::registry::Category;

/// Cache key: a registry category or a supplementary long-format series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKey {
    Indicator(Category),
    Long(&'static str),
}

pub type Series = Arc<Vec<Observation>>;

// ---------------------------------------------------------------------------
// DataCache – write-once, read-many memo of loaded series
// ---------------------------------------------------------------------------

/// Process-lifetime memo of loaded series.
///
/// Owned by whoever composes the loader (see [`crate::dashboard::Dashboard`]).
/// Entries are never evicted or replaced; failed loads are not stored, so a
/// file that appears later is picked up on the next request.
#[derive(Debug, Default)]
pub struct DataCache {
    entries: Mutex<BTreeMap<SeriesKey, Series>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SeriesKey, Series>> {
        // The map is only ever inserted into, so a poisoned guard is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached series for `key`, running `load` to populate it on
    /// first use. The lock is held across `load` so concurrent first calls
    /// read the file only once.
    pub fn get_or_populate<F>(&self, key: SeriesKey, load: F) -> Result<Series>
    where
        F: FnOnce() -> Result<Vec<Observation>>,
    {
        let mut entries = self.lock();
        if let Some(hit) = entries.get(&key) {
            log::debug!("cache hit for {key:?}");
            return Ok(Arc::clone(hit));
        }
        let series = Arc::new(load()?);
        entries.insert(key, Arc::clone(&series));
        Ok(series)
    }

    pub fn get(&self, key: SeriesKey) -> Option<Series> {
        self.lock().get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::DashboardError;

    #[test]
    fn second_call_returns_same_allocation_without_loading() {
        let cache = DataCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(vec![Observation::new(2000, 1.0)])
        };

        let first = cache
            .get_or_populate(SeriesKey::Indicator(Category::Gdp), load)
            .unwrap();
        let second = cache
            .get_or_populate(SeriesKey::Indicator(Category::Gdp), || {
                panic!("must not reload a cached series")
            })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = DataCache::new();
        let key = SeriesKey::Long("exports");

        let err = cache
            .get_or_populate(key, || {
                Err(DashboardError::DataSourceMissing {
                    path: "Economy/x.csv".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataSourceMissing { .. }));
        assert!(cache.get(key).is_none());

        let ok = cache.get_or_populate(key, || Ok(Vec::new())).unwrap();
        assert!(ok.is_empty());
        assert!(cache.get(key).is_some());
    }

    #[test]
    fn concurrent_first_population_loads_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = DataCache::new();
        let loads = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_populate(SeriesKey::Indicator(Category::Health), || {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(vec![Observation::new(2020, 17.1)])
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
