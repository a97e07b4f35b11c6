// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::repositories::tld_repository::TldRepository;
use crate::infrastructure::database::connection::connect_in_memory;
use crate::infrastructure::repositories::tld_repo_impl::TldRepoImpl;
use migration::{Migrator, MigratorTrait};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

async fn setup() -> DroppedDomainRepoImpl {
    let db = Arc::new(connect_in_memory().await.unwrap());
    Migrator::up(db.as_ref(), None).await.unwrap();
    let tlds = TldRepoImpl::new(db.clone());
    tlds.find_or_create("com").await.unwrap();
    DroppedDomainRepoImpl::new(db)
}

fn record(label: &str) -> DroppedDomain {
    DroppedDomain::new(label, "com", date(), Charset::Letters)
}

#[tokio::test]
async fn test_insert_many_and_query() {
    let repo = setup().await;
    let records = vec![record("beta").with_score(91), record("alpha")];

    assert_eq!(repo.insert_many(&records).await.unwrap(), 2);
    assert_eq!(repo.insert_many(&[]).await.unwrap(), 0);

    let found = repo.find_by_tld_and_date("com", date()).await.unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].domain, "alpha.com");
    assert_eq!(found[1].quality_score, Some(91));
    assert_eq!(found[1].charset, Charset::Letters);
    assert_eq!(found[1].label(), "beta");

    let existing = repo.existing_domains("com", date()).await.unwrap();
    assert!(existing.contains("beta.com"));
    assert_eq!(repo.count_by_tld_and_date("com", date()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_is_reported_as_conflict() {
    let repo = setup().await;
    repo.insert_one(&record("beta")).await.unwrap();

    let err = repo.insert_one(&record("beta")).await.unwrap_err();
    assert!(err.is_conflict());

    // one duplicate sinks the whole statement
    let err = repo
        .insert_many(&[record("gamma"), record("beta")])
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(repo.count_by_tld_and_date("com", date()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_same_domain_on_another_date_is_allowed() {
    let repo = setup().await;
    repo.insert_one(&record("beta")).await.unwrap();

    let next_day = date().succ_opt().unwrap();
    let later = DroppedDomain::new("beta", "com", next_day, Charset::Letters);
    repo.insert_one(&later).await.unwrap();

    assert_eq!(repo.count_by_tld_and_date("com", next_day).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unscored_rows_can_be_scored() {
    let repo = setup().await;
    repo.insert_many(&[record("beta"), record("aaaa").with_score(63)])
        .await
        .unwrap();

    let unscored = repo.find_unscored(10).await.unwrap();
    assert_eq!(unscored.len(), 1);
    assert_eq!(unscored[0].domain, "beta.com");

    repo.set_quality_score(unscored[0].id, 91).await.unwrap();
    assert!(repo.find_unscored(10).await.unwrap().is_empty());

    let err = repo.set_quality_score(Uuid::new_v4(), 1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
