// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tld::{normalize_tld, Tld};
use crate::domain::repositories::tld_repository::TldRepository;
use crate::infrastructure::database::entities::tld;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

/// 顶级域名仓库实现
#[derive(Clone)]
pub struct TldRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl TldRepoImpl {
    /// 创建新的顶级域名仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TldRepository for TldRepoImpl {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tld>, RepositoryError> {
        let model = tld::Entity::find_by_id(normalize_tld(name))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_or_create(&self, name: &str) -> Result<Tld, RepositoryError> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        let record = Tld::new(name);
        let model = tld::ActiveModel {
            name: Set(record.name.clone()),
            display_name: Set(record.display_name.clone()),
            is_active: Set(record.is_active),
            last_import_date: Set(record.last_import_date),
            last_drop_count: Set(record.last_drop_count),
            created_at: Set(record.created_at.into()),
            updated_at: Set(record.updated_at.into()),
        };

        match model.insert(self.db.as_ref()).await.map_err(RepositoryError::from) {
            Ok(model) => Ok(model.into()),
            // another worker created it first
            Err(RepositoryError::Conflict(_)) => self
                .find_by_name(&record.name)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn update_import_metadata(
        &self,
        name: &str,
        import_date: NaiveDate,
        drop_count: i64,
    ) -> Result<(), RepositoryError> {
        let result = tld::Entity::update_many()
            .col_expr(tld::Column::LastImportDate, Expr::value(import_date))
            .col_expr(tld::Column::LastDropCount, Expr::value(drop_count))
            .col_expr(
                tld::Column::UpdatedAt,
                Expr::value(DateTime::<chrono::FixedOffset>::from(Utc::now())),
            )
            .filter(tld::Column::Name.eq(normalize_tld(name)))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl From<tld::Model> for Tld {
    fn from(model: tld::Model) -> Self {
        Self {
            name: model.name,
            display_name: model.display_name,
            is_active: model.is_active,
            last_import_date: model.last_import_date,
            last_drop_count: model.last_drop_count,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[cfg(test)]
#[path = "tld_repo_impl_test.rs"]
mod tests;
