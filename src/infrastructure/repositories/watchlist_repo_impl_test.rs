// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;
use crate::domain::models::dropped_domain::Charset;
use crate::infrastructure::database::connection::connect_in_memory;
use migration::{Migrator, MigratorTrait};

async fn setup() -> WatchlistRepoImpl {
    let db = Arc::new(connect_in_memory().await.unwrap());
    Migrator::up(db.as_ref(), None).await.unwrap();
    WatchlistRepoImpl::new(db)
}

#[tokio::test]
async fn test_create_and_find_round_trip() {
    let repo = setup().await;
    let mut watchlist = Watchlist::new(Uuid::new_v4(), "short letters");
    watchlist.domain_pattern = Some("be*".to_string());
    watchlist.max_length = Some(4);
    watchlist.charset_filter = Some(Charset::Letters);
    watchlist.notify_webhook = true;

    repo.create(&watchlist).await.unwrap();
    let found = repo.find_by_id(watchlist.id).await.unwrap().unwrap();

    assert_eq!(found.name, "short letters");
    assert_eq!(found.domain_pattern.as_deref(), Some("be*"));
    assert_eq!(found.max_length, Some(4));
    assert_eq!(found.charset_filter, Some(Charset::Letters));
    assert!(found.notify_email);
    assert!(found.notify_webhook);
    assert!(found.last_notified_at.is_none());
}

#[tokio::test]
async fn test_find_active_skips_inactive() {
    let repo = setup().await;
    let owner = Uuid::new_v4();
    let active = Watchlist::new(owner, "active");
    let mut inactive = Watchlist::new(owner, "inactive");
    inactive.is_active = false;
    repo.create(&active).await.unwrap();
    repo.create(&inactive).await.unwrap();

    let found = repo.find_active().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, active.id);
}

#[tokio::test]
async fn test_mark_notified() {
    let repo = setup().await;
    let watchlist = Watchlist::new(Uuid::new_v4(), "alerts");
    repo.create(&watchlist).await.unwrap();

    repo.mark_notified(watchlist.id, Utc::now()).await.unwrap();
    let found = repo.find_by_id(watchlist.id).await.unwrap().unwrap();
    assert!(found.last_notified_at.is_some());

    let err = repo.mark_notified(Uuid::new_v4(), Utc::now()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
