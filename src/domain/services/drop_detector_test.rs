// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::tld::Tld;
use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::DbErr;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

fn set(labels: &[&str]) -> HashSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn transient() -> RepositoryError {
    RepositoryError::Database(DbErr::Custom("database is locked".to_string()))
}

#[derive(Default)]
struct MockDomainRepo {
    rows: Mutex<Vec<DroppedDomain>>,
    bulk_failures: AtomicU32,
    bulk_calls: AtomicU32,
    poisoned: Mutex<HashSet<String>>,
}

impl MockDomainRepo {
    fn has(&self, record: &DroppedDomain) -> bool {
        self.rows
            .lock()
            .iter()
            .any(|r| r.domain == record.domain && r.drop_date == record.drop_date)
    }
}

#[async_trait]
impl DroppedDomainRepository for MockDomainRepo {
    async fn existing_domains(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<HashSet<String>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|r| r.tld == tld && r.drop_date == drop_date)
            .map(|r| r.domain.clone())
            .collect())
    }

    async fn insert_many(&self, records: &[DroppedDomain]) -> Result<u64, RepositoryError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        if self.bulk_failures.load(Ordering::SeqCst) > 0 {
            self.bulk_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(transient());
        }
        if records.iter().any(|r| self.has(r)) {
            return Err(RepositoryError::Conflict("dropped_domains".to_string()));
        }
        self.rows.lock().extend(records.iter().cloned());
        Ok(records.len() as u64)
    }

    async fn insert_one(&self, record: &DroppedDomain) -> Result<(), RepositoryError> {
        if self.poisoned.lock().contains(&record.domain) {
            return Err(transient());
        }
        if self.has(record) {
            return Err(RepositoryError::Conflict("dropped_domains".to_string()));
        }
        self.rows.lock().push(record.clone());
        Ok(())
    }

    async fn find_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<Vec<DroppedDomain>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|r| r.tld == tld && r.drop_date == drop_date)
            .cloned()
            .collect())
    }

    async fn count_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        Ok(self.find_by_tld_and_date(tld, drop_date).await?.len() as u64)
    }

    async fn find_unscored(&self, limit: u64) -> Result<Vec<DroppedDomain>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|r| r.quality_score.is_none())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn set_quality_score(&self, id: Uuid, score: i32) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.quality_score = Some(score);
        Ok(())
    }
}

#[derive(Default)]
struct MockTldRepo {
    metadata: Mutex<Vec<(String, NaiveDate, i64)>>,
}

#[async_trait]
impl TldRepository for MockTldRepo {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tld>, RepositoryError> {
        Ok(Some(Tld::new(name)))
    }

    async fn find_or_create(&self, name: &str) -> Result<Tld, RepositoryError> {
        Ok(Tld::new(name))
    }

    async fn update_import_metadata(
        &self,
        name: &str,
        import_date: NaiveDate,
        drop_count: i64,
    ) -> Result<(), RepositoryError> {
        self.metadata
            .lock()
            .push((name.to_string(), import_date, drop_count));
        Ok(())
    }
}

fn options() -> PersistenceOptions {
    PersistenceOptions {
        batch_size: 2,
        throttle_every: 3,
        throttle_pause: Duration::from_millis(1),
        max_retries: 2,
        retry_backoff: Duration::ZERO,
        score_drops: true,
    }
}

fn persistence(
    domains: &Arc<MockDomainRepo>,
    tlds: &Arc<MockTldRepo>,
) -> DropPersistence {
    DropPersistence::new(domains.clone(), tlds.clone(), options())
}

#[test]
fn test_compute_dropped_is_set_difference() {
    let previous = set(&["alpha", "beta", "gamma"]);
    let current = set(&["alpha", "gamma", "delta"]);

    let dropped = compute_dropped(&previous, &current);
    assert_eq!(dropped.into_iter().collect::<Vec<_>>(), vec!["beta"]);

    assert!(compute_dropped(&previous, &previous).is_empty());
    assert!(compute_dropped(&HashSet::new(), &current).is_empty());
    assert_eq!(compute_dropped(&previous, &HashSet::new()).len(), 3);
}

#[test]
fn test_compute_dropped_is_sorted() {
    let previous = set(&["zeta", "alpha", "mu"]);
    let dropped: Vec<String> = compute_dropped(&previous, &HashSet::new())
        .into_iter()
        .collect();
    assert_eq!(dropped, vec!["alpha", "mu", "zeta"]);
}

#[test]
fn test_classify_charset() {
    assert_eq!(classify_charset("beta"), Charset::Letters);
    assert_eq!(classify_charset("2048"), Charset::Numbers);
    assert_eq!(classify_charset("web3"), Charset::Mixed);
    assert_eq!(classify_charset("my-shop"), Charset::Mixed);
    assert_eq!(classify_charset(""), Charset::Mixed);
}

#[tokio::test]
async fn test_persist_inserts_scored_records_and_updates_metadata() {
    let domains = Arc::new(MockDomainRepo::default());
    let tlds = Arc::new(MockTldRepo::default());
    let labels: BTreeSet<String> = ["beta", "app2", "1234", "zz"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let outcome = persistence(&domains, &tlds)
        .persist("com", date(), &labels)
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 4);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.failed, 0);
    let persisted: Vec<&str> = outcome.persisted.iter().map(|d| d.domain.as_str()).collect();
    assert_eq!(persisted, vec!["1234.com", "app2.com", "beta.com", "zz.com"]);

    let beta = outcome
        .persisted
        .iter()
        .find(|d| d.domain == "beta.com")
        .unwrap();
    assert_eq!(beta.length, 4);
    assert_eq!(beta.charset, Charset::Letters);
    assert_eq!(beta.quality_score, Some(91));

    assert_eq!(
        tlds.metadata.lock().clone(),
        vec![("com".to_string(), date(), 4)]
    );
}

#[tokio::test]
async fn test_persist_twice_is_idempotent() {
    let domains = Arc::new(MockDomainRepo::default());
    let tlds = Arc::new(MockTldRepo::default());
    let labels: BTreeSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let service = persistence(&domains, &tlds);

    let first = service.persist("io", date(), &labels).await.unwrap();
    let second = service.persist("io", date(), &labels).await.unwrap();

    assert_eq!(first.inserted, 3);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert!(second.persisted.is_empty());
    assert_eq!(domains.rows.lock().len(), 3);
    // metadata still written for the no-op run
    assert_eq!(tlds.metadata.lock().last().unwrap().2, 0);
}

#[tokio::test]
async fn test_transient_bulk_failure_is_retried() {
    let domains = Arc::new(MockDomainRepo::default());
    domains.bulk_failures.store(1, Ordering::SeqCst);
    let tlds = Arc::new(MockTldRepo::default());
    let labels: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();

    let outcome = persistence(&domains, &tlds)
        .persist("io", date(), &labels)
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 2);
    assert_eq!(domains.bulk_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_exhausted_bulk_retries_fall_back_to_rows() {
    let domains = Arc::new(MockDomainRepo::default());
    // initial attempt + 2 retries all fail
    domains.bulk_failures.store(3, Ordering::SeqCst);
    domains.poisoned.lock().insert("b.io".to_string());
    let tlds = Arc::new(MockTldRepo::default());
    let labels: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();

    let outcome = persistence(&domains, &tlds)
        .persist("io", date(), &labels)
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.persisted[0].domain, "a.io");
    assert_eq!(tlds.metadata.lock().last().unwrap().2, 1);
}

#[tokio::test]
async fn test_conflicting_batch_is_resolved_row_by_row() {
    let domains = Arc::new(MockDomainRepo::default());
    let tlds = Arc::new(MockTldRepo::default());
    // row invisible to the existence query but still hitting the unique key
    let mut ghost = DroppedDomain::new("b", "io", date(), Charset::Letters);
    ghost.tld = "other".to_string();
    domains.rows.lock().push(ghost);

    let labels: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
    let outcome = persistence(&domains, &tlds)
        .persist("io", date(), &labels)
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.failed, 0);
}

#[tokio::test]
async fn test_backfill_quality_scores() {
    let domains = Arc::new(MockDomainRepo::default());
    let tlds = Arc::new(MockTldRepo::default());
    let mut service_options = options();
    service_options.score_drops = false;
    let service = DropPersistence::new(domains.clone(), tlds.clone(), service_options);

    let labels: BTreeSet<String> = ["beta", "aaaa"].iter().map(|s| s.to_string()).collect();
    let outcome = service.persist("com", date(), &labels).await.unwrap();
    assert!(outcome.persisted.iter().all(|d| d.quality_score.is_none()));

    let updated = service.backfill_quality_scores(10).await.unwrap();
    assert_eq!(updated, 2);

    let rows = domains.rows.lock();
    let beta = rows.iter().find(|d| d.domain == "beta.com").unwrap();
    let aaaa = rows.iter().find(|d| d.domain == "aaaa.com").unwrap();
    assert_eq!(beta.quality_score, Some(91));
    assert_eq!(aaaa.quality_score, Some(63));
}
