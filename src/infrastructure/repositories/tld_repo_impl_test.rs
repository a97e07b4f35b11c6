// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::infrastructure::database::connection::connect_in_memory;
use migration::{Migrator, MigratorTrait};

async fn setup() -> TldRepoImpl {
    let db = Arc::new(connect_in_memory().await.unwrap());
    Migrator::up(db.as_ref(), None).await.unwrap();
    TldRepoImpl::new(db)
}

#[tokio::test]
async fn test_find_or_create_normalizes_and_is_stable() {
    let repo = setup().await;

    let created = repo.find_or_create(".COM").await.unwrap();
    assert_eq!(created.name, "com");
    assert!(created.is_active);
    assert_eq!(created.last_drop_count, 0);

    let again = repo.find_or_create("com").await.unwrap();
    assert_eq!(again.name, "com");
    assert_eq!(again.created_at, created.created_at);
}

#[tokio::test]
async fn test_update_import_metadata() {
    let repo = setup().await;
    repo.find_or_create("net").await.unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    repo.update_import_metadata("net", date, 42).await.unwrap();

    let tld = repo.find_by_name("net").await.unwrap().unwrap();
    assert_eq!(tld.last_import_date, Some(date));
    assert_eq!(tld.last_drop_count, 42);
}

#[tokio::test]
async fn test_update_import_metadata_for_unknown_tld() {
    let repo = setup().await;
    let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    let err = repo.update_import_metadata("org", date, 1).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
