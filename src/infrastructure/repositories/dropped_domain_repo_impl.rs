// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::dropped_domain::{Charset, DroppedDomain};
use crate::domain::repositories::dropped_domain_repository::DroppedDomainRepository;
use crate::infrastructure::database::entities::dropped_domain;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// 掉落域名仓库实现
///
/// 批量写入使用单条 INSERT 语句，任一行违反 `(domain, drop_date)`
/// 唯一约束时整批失败并返回 `RepositoryError::Conflict`
#[derive(Clone)]
pub struct DroppedDomainRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl DroppedDomainRepoImpl {
    /// 创建新的掉落域名仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_active_model(record: &DroppedDomain) -> dropped_domain::ActiveModel {
    dropped_domain::ActiveModel {
        id: Set(record.id),
        domain: Set(record.domain.clone()),
        tld: Set(record.tld.clone()),
        drop_date: Set(record.drop_date),
        length: Set(record.length),
        label_count: Set(record.label_count),
        charset_type: Set(record.charset.to_string()),
        quality_score: Set(record.quality_score),
        created_at: Set(record.created_at.into()),
    }
}

#[async_trait]
impl DroppedDomainRepository for DroppedDomainRepoImpl {
    async fn existing_domains(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<HashSet<String>, RepositoryError> {
        let domains: Vec<String> = dropped_domain::Entity::find()
            .select_only()
            .column(dropped_domain::Column::Domain)
            .filter(dropped_domain::Column::Tld.eq(tld))
            .filter(dropped_domain::Column::DropDate.eq(drop_date))
            .into_tuple()
            .all(self.db.as_ref())
            .await?;
        Ok(domains.into_iter().collect())
    }

    async fn insert_many(&self, records: &[DroppedDomain]) -> Result<u64, RepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }
        let inserted = dropped_domain::Entity::insert_many(records.iter().map(to_active_model))
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(inserted)
    }

    async fn insert_one(&self, record: &DroppedDomain) -> Result<(), RepositoryError> {
        dropped_domain::Entity::insert(to_active_model(record))
            .exec_without_returning(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn find_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<Vec<DroppedDomain>, RepositoryError> {
        let models = dropped_domain::Entity::find()
            .filter(dropped_domain::Column::Tld.eq(tld))
            .filter(dropped_domain::Column::DropDate.eq(drop_date))
            .order_by_asc(dropped_domain::Column::Domain)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let count = dropped_domain::Entity::find()
            .filter(dropped_domain::Column::Tld.eq(tld))
            .filter(dropped_domain::Column::DropDate.eq(drop_date))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn find_unscored(&self, limit: u64) -> Result<Vec<DroppedDomain>, RepositoryError> {
        let models = dropped_domain::Entity::find()
            .filter(dropped_domain::Column::QualityScore.is_null())
            .order_by_asc(dropped_domain::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn set_quality_score(&self, id: Uuid, score: i32) -> Result<(), RepositoryError> {
        let result = dropped_domain::Entity::update_many()
            .col_expr(dropped_domain::Column::QualityScore, Expr::value(score))
            .filter(dropped_domain::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl From<dropped_domain::Model> for DroppedDomain {
    fn from(model: dropped_domain::Model) -> Self {
        Self {
            id: model.id,
            domain: model.domain,
            tld: model.tld,
            drop_date: model.drop_date,
            length: model.length,
            label_count: model.label_count,
            charset: model.charset_type.parse().unwrap_or(Charset::Mixed),
            quality_score: model.quality_score,
            created_at: model.created_at.into(),
        }
    }
}

#[cfg(test)]
#[path = "dropped_domain_repo_impl_test.rs"]
mod tests;
