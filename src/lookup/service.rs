use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::catalog::Catalog;

use super::{LookupCriteria, LookupResult};

/// Bounded retry around a lookup that matched nothing.
///
/// Each attempt rescans a fresh catalog snapshot, so a retry can only change
/// the outcome when the catalog behind the service is refreshed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of scans, including the first
    pub max_attempts: u32,
    /// Pause between scans
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// Resolves lookup criteria against an injected catalog.
#[derive(Clone)]
pub struct LookupService {
    catalog: Arc<dyn Catalog>,
    retry: Option<RetryPolicy>,
}

impl LookupService {
    /// Creates a service that scans `catalog` once per lookup.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog, retry: None }
    }

    /// Enables retrying lookups that match nothing.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry
    }

    /// Scans the catalog once.
    pub fn scan(&self, criteria: &LookupCriteria) -> LookupResult {
        let snapshot = self.catalog.snapshot();
        let matches = snapshot
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect();
        LookupResult::from_matches(matches)
    }

    /// Looks up every record matching `criteria`, retrying if configured.
    pub async fn lookup(&self, criteria: &LookupCriteria) -> LookupResult {
        let Some(policy) = self.retry else {
            return self.finish(self.scan(criteria));
        };

        let max_attempts = policy.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let result = self.scan(criteria);
            if result.is_found() || attempt == max_attempts {
                return self.finish(result);
            }

            info!(
                attempt,
                max_attempts,
                delay_ms = policy.delay.as_millis() as u64,
                "No matching pill found, retrying"
            );
            tokio::time::sleep(policy.delay).await;
        }

        LookupResult::NotFound
    }

    fn finish(&self, result: LookupResult) -> LookupResult {
        match &result {
            LookupResult::Found(records) => debug!(matches = records.len(), "Lookup matched"),
            LookupResult::NotFound => info!("No matching pills found in the catalog"),
        }
        result
    }
}

impl fmt::Debug for LookupService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupService")
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogStore, MockCatalog, PillRecord, Snapshot};
    use std::time::Instant;

    fn advil() -> PillRecord {
        PillRecord::new("Advil", "brown", "round", "I2", "http://x/1")
    }

    fn service(records: Vec<PillRecord>) -> LookupService {
        LookupService::new(Arc::new(CatalogStore::from_records(records).unwrap()))
    }

    fn names(result: &LookupResult) -> Vec<&str> {
        result.records().iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_color_and_shape_match_single_record() {
        let service = service(vec![advil()]);
        let result = service.lookup(&LookupCriteria::new("brown", "round")).await;
        assert_eq!(result, LookupResult::Found(vec![Arc::new(advil())]));
    }

    #[tokio::test]
    async fn test_unknown_imprint_is_not_found() {
        let service = service(vec![advil()]);
        let criteria = LookupCriteria::new("brown", "round").with_imprint("ZZZ");
        assert_eq!(service.lookup(&criteria).await, LookupResult::NotFound);
    }

    #[tokio::test]
    async fn test_multiple_matches_keep_catalog_order() {
        let service = service(vec![
            PillRecord::new("First", "white", "oval", "A1", "http://x/a"),
            advil(),
            PillRecord::new("Second", "white", "oval", "B2", "http://x/b"),
        ]);

        let result = service.lookup(&LookupCriteria::new("white", "oval")).await;
        assert_eq!(names(&result), vec!["First", "Second"]);

        let result = service
            .lookup(&LookupCriteria::new("white", "oval").with_imprint("B2"))
            .await;
        assert_eq!(names(&result), vec!["Second"]);
    }

    #[tokio::test]
    async fn test_repeated_lookups_are_identical() {
        let service = service(vec![
            PillRecord::new("First", "white", "oval", "A1", "http://x/a"),
            PillRecord::new("Second", "white", "oval", "B2", "http://x/b"),
        ]);
        let criteria = LookupCriteria::new("white", "oval");

        let first = service.lookup(&criteria).await;
        let second = service.lookup(&criteria).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_matches_are_shared_with_catalog() {
        let store = Arc::new(CatalogStore::from_records(vec![advil()]).unwrap());
        let service = LookupService::new(store.clone());

        let result = service.lookup(&LookupCriteria::new("brown", "round")).await;
        assert!(Arc::ptr_eq(&result.records()[0], &store.records()[0]));
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempts_then_not_found() {
        let snapshot: Snapshot = vec![Arc::new(advil())].into();
        let mut catalog = MockCatalog::new();
        catalog
            .expect_snapshot()
            .times(3)
            .returning(move || snapshot.clone());

        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };
        let service = LookupService::new(Arc::new(catalog)).with_retry(policy);

        let started = Instant::now();
        let result = service
            .lookup(&LookupCriteria::new("brown", "round").with_imprint("ZZZ"))
            .await;

        assert_eq!(result, LookupResult::NotFound);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_retry_wait_does_not_block_other_lookups() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(200),
        };
        let service = service(vec![advil()]).with_retry(policy);
        let missing = LookupCriteria::new("brown", "round").with_imprint("ZZZ");
        let present = LookupCriteria::new("brown", "round");

        let started = Instant::now();
        let (missed, (matched, matched_after)) = tokio::join!(service.lookup(&missing), async {
            let result = service.lookup(&present).await;
            (result, started.elapsed())
        });

        assert_eq!(missed, LookupResult::NotFound);
        assert_eq!(names(&matched), vec!["Advil"]);
        assert!(matched_after < policy.delay);
    }

    #[tokio::test]
    async fn test_retry_stops_at_first_match() {
        let snapshot: Snapshot = vec![Arc::new(advil())].into();
        let mut catalog = MockCatalog::new();
        catalog
            .expect_snapshot()
            .times(1)
            .returning(move || snapshot.clone());

        let service = LookupService::new(Arc::new(catalog)).with_retry(RetryPolicy::default());
        let result = service.lookup(&LookupCriteria::new("brown", "round")).await;
        assert!(result.is_found());
    }

    #[tokio::test]
    async fn test_retry_sees_refreshed_catalog() {
        let mut seq = mockall::Sequence::new();
        let mut catalog = MockCatalog::new();
        catalog
            .expect_snapshot()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Vec::<Arc<PillRecord>>::new().into());
        catalog
            .expect_snapshot()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| vec![Arc::new(advil())].into());

        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(1),
        };
        let service = LookupService::new(Arc::new(catalog)).with_retry(policy);

        let result = service.lookup(&LookupCriteria::new("brown", "round")).await;
        assert_eq!(names(&result), vec!["Advil"]);
    }

    #[tokio::test]
    async fn test_without_retry_scans_once() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_snapshot()
            .times(1)
            .returning(|| Vec::<Arc<PillRecord>>::new().into());

        let service = LookupService::new(Arc::new(catalog));
        assert_eq!(service.retry_policy(), None);
        assert_eq!(
            service.lookup(&LookupCriteria::new("brown", "round")).await,
            LookupResult::NotFound
        );
    }
}
