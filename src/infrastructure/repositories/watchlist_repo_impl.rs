// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::watchlist::Watchlist;
use crate::domain::repositories::watchlist_repository::WatchlistRepository;
use crate::infrastructure::database::entities::watchlist;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 关注列表仓库实现
#[derive(Clone)]
pub struct WatchlistRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WatchlistRepoImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WatchlistRepository for WatchlistRepoImpl {
    async fn create(&self, watchlist: &Watchlist) -> Result<Watchlist, RepositoryError> {
        let model = watchlist::ActiveModel {
            id: Set(watchlist.id),
            owner_id: Set(watchlist.owner_id),
            name: Set(watchlist.name.clone()),
            domain_pattern: Set(watchlist.domain_pattern.clone()),
            tld_filter: Set(watchlist.tld_filter.clone()),
            min_length: Set(watchlist.min_length),
            max_length: Set(watchlist.max_length),
            charset_filter: Set(watchlist.charset_filter.map(|c| c.to_string())),
            min_quality_score: Set(watchlist.min_quality_score),
            notify_email: Set(watchlist.notify_email),
            notify_telegram: Set(watchlist.notify_telegram),
            notify_discord: Set(watchlist.notify_discord),
            notify_webhook: Set(watchlist.notify_webhook),
            is_active: Set(watchlist.is_active),
            last_notified_at: Set(watchlist.last_notified_at.map(Into::into)),
            created_at: Set(watchlist.created_at.into()),
            updated_at: Set(watchlist.updated_at.into()),
        };

        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Watchlist>, RepositoryError> {
        let model = watchlist::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_active(&self) -> Result<Vec<Watchlist>, RepositoryError> {
        let models = watchlist::Entity::find()
            .filter(watchlist::Column::IsActive.eq(true))
            .order_by_asc(watchlist::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let at: DateTime<FixedOffset> = at.into();
        let result = watchlist::Entity::update_many()
            .col_expr(watchlist::Column::LastNotifiedAt, Expr::value(at))
            .col_expr(watchlist::Column::UpdatedAt, Expr::value(at))
            .filter(watchlist::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl From<watchlist::Model> for Watchlist {
    fn from(model: watchlist::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            domain_pattern: model.domain_pattern,
            tld_filter: model.tld_filter,
            min_length: model.min_length,
            max_length: model.max_length,
            // unknown charset values disable the filter
            charset_filter: model.charset_filter.and_then(|c| c.parse().ok()),
            min_quality_score: model.min_quality_score,
            notify_email: model.notify_email,
            notify_telegram: model.notify_telegram,
            notify_discord: model.notify_discord,
            notify_webhook: model.notify_webhook,
            is_active: model.is_active,
            last_notified_at: model.last_notified_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[cfg(test)]
#[path = "watchlist_repo_impl_test.rs"]
mod tests;
