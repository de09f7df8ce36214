//! Best-effort building visit tallies.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;

/// Increments for the same building inside this window are ignored.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_secs(120);

/// Sink for "a route to this building was served" events.
///
/// Callers treat failures as non-fatal.
pub trait VisitCounter: Send + Sync {
    fn increment_visit(&self, building: &str) -> Result<()>;
}

/// Counter that discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisitCounter;

impl VisitCounter for NoopVisitCounter {
    fn increment_visit(&self, _building: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct VisitRecord {
    count: u64,
    last_counted: Instant,
}

/// In-memory visit counter with per-building throttling.
#[derive(Debug)]
pub struct ThrottledVisitCounter {
    window: Duration,
    records: Mutex<HashMap<String, VisitRecord>>,
}

impl Default for ThrottledVisitCounter {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

impl ThrottledVisitCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Count a visit at `now`. Returns `false` when throttled.
    pub fn record_at(&self, building: &str, now: Instant) -> bool {
        let mut records = self.lock();
        match records.get_mut(building) {
            Some(record) if now.saturating_duration_since(record.last_counted) < self.window => {
                false
            }
            Some(record) => {
                record.count += 1;
                record.last_counted = now;
                true
            }
            None => {
                records.insert(
                    building.to_string(),
                    VisitRecord {
                        count: 1,
                        last_counted: now,
                    },
                );
                true
            }
        }
    }

    /// Visits counted for `building` so far.
    pub fn visits(&self, building: &str) -> u64 {
        self.lock().get(building).map_or(0, |record| record.count)
    }

    /// Most visited buildings, highest count first, ties alphabetical.
    pub fn popular(&self, limit: usize) -> Vec<(String, u64)> {
        let mut tallies: Vec<(String, u64)> = self
            .lock()
            .iter()
            .map(|(name, record)| (name.clone(), record.count))
            .collect();
        tallies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tallies.truncate(limit);
        tallies
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VisitRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VisitCounter for ThrottledVisitCounter {
    fn increment_visit(&self, building: &str) -> Result<()> {
        let counted = self.record_at(building, Instant::now());
        debug!(building, counted, "visit increment");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_inside_window_are_throttled() {
        let counter = ThrottledVisitCounter::default();
        let start = Instant::now();
        assert!(counter.record_at("Northrop", start));
        assert!(!counter.record_at("Northrop", start + Duration::from_secs(60)));
        assert!(counter.record_at("Northrop", start + Duration::from_secs(121)));
        assert_eq!(counter.visits("Northrop"), 2);
    }

    #[test]
    fn buildings_are_throttled_independently() {
        let counter = ThrottledVisitCounter::default();
        let now = Instant::now();
        assert!(counter.record_at("Northrop", now));
        assert!(counter.record_at("Coffman Union", now));
        assert_eq!(counter.visits("Walter Library"), 0);
    }

    #[test]
    fn popular_orders_by_count() {
        let counter = ThrottledVisitCounter::new(Duration::ZERO);
        for name in ["Northrop", "Coffman Union", "Northrop", "Walter Library", "Coffman Union"] {
            counter.increment_visit(name).unwrap();
        }
        counter.increment_visit("Northrop").unwrap();
        assert_eq!(
            counter.popular(2),
            vec![("Northrop".to_string(), 3), ("Coffman Union".to_string(), 2)]
        );
    }
}
