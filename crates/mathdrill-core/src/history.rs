//! History store interface and the in-memory implementation.
//!
//! A history store is an append-only sequence of [`TestResult`]s covering a
//! rolling 30-day window. Every append prunes older entries in the same step.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::model::TestResult;

/// How long results are kept.
pub const RETENTION_DAYS: i64 = 30;

/// Durable collection of completed test results.
pub trait HistoryStore: Send + Sync {
    /// Append a result and prune entries older than the retention window.
    ///
    /// A result whose id is already stored is ignored.
    fn append(&mut self, result: TestResult) -> Result<()>;

    /// All retained results. Order is not guaranteed.
    fn all(&self) -> Result<Vec<TestResult>>;
}

/// Oldest timestamp still inside the retention window.
pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(RETENTION_DAYS)
}

/// Append `result` to `results` unless its id is present, then prune.
///
/// Returns `true` if the result was added.
pub fn append_and_prune(
    results: &mut Vec<TestResult>,
    result: TestResult,
    now: DateTime<Utc>,
) -> bool {
    let added = if results.iter().any(|r| r.id == result.id) {
        tracing::debug!(id = %result.id, "result already recorded, skipping");
        false
    } else {
        results.push(result);
        true
    };

    let cutoff = retention_cutoff(now);
    let before = results.len();
    results.retain(|r| r.completed_at >= cutoff);
    let pruned = before - results.len();
    if pruned > 0 {
        tracing::debug!(pruned, "pruned results older than {RETENTION_DAYS} days");
    }

    added
}

/// History kept in process memory.
pub struct MemoryHistory {
    results: Vec<TestResult>,
    clock: Arc<dyn Clock>,
}

impl MemoryHistory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            results: Vec::new(),
            clock,
        }
    }

    /// Seed the store with existing results without pruning them.
    pub fn with_results(clock: Arc<dyn Clock>, results: Vec<TestResult>) -> Self {
        Self { results, clock }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, result: TestResult) -> Result<()> {
        let now = self.clock.now();
        append_and_prune(&mut self.results, result, now);
        Ok(())
    }

    fn all(&self) -> Result<Vec<TestResult>> {
        Ok(self.results.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn result(id: &str, at: DateTime<Utc>) -> TestResult {
        TestResult::new(id, at, 10, 1, vec![])
    }

    #[test]
    fn append_and_read_back() {
        let mut store = MemoryHistory::new(Arc::new(FixedClock::new(now())));
        store.append(result("a", now())).unwrap();
        store.append(result("b", now())).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn append_prunes_old_entries() {
        let clock = Arc::new(FixedClock::new(now()));
        let mut store = MemoryHistory::with_results(
            clock.clone(),
            vec![
                result("old", now() - Duration::days(31)),
                result("edge", now() - Duration::days(30)),
                result("recent", now() - Duration::days(3)),
            ],
        );
        assert_eq!(store.len(), 3);

        store.append(result("new", now())).unwrap();
        let ids: Vec<String> = store.all().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["edge", "recent", "new"]);
    }

    #[test]
    fn duplicate_ids_are_ignored() {
        let mut results = Vec::new();
        assert!(append_and_prune(&mut results, result("a", now()), now()));
        assert!(!append_and_prune(&mut results, result("a", now()), now()));
        assert_eq!(results.len(), 1);
    }
}
