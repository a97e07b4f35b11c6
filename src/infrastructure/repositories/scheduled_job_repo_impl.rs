// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::scheduled_job::{JobStatus, ScheduledJob};
use crate::domain::repositories::scheduled_job_repository::ScheduledJobRepository;
use crate::infrastructure::database::entities::scheduled_job as job_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 定时任务仓库实现
///
/// 基于SeaORM实现的定时任务数据访问层，每个顶级域名至多一个任务
#[derive(Clone)]
pub struct ScheduledJobRepoImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ScheduledJobRepoImpl {
    /// 创建新的定时任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for ScheduledJob {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            tld: model.tld,
            cron_hour: model.cron_hour,
            cron_minute: model.cron_minute,
            job_type: model.job_type.parse().unwrap_or_default(),
            is_enabled: model.is_enabled,
            priority: model.priority,
            timeout_minutes: model.timeout_minutes,
            retry_count: model.retry_count,
            last_run_at: model.last_run_at.map(Into::into),
            next_run_at: model.next_run_at.map(Into::into),
            last_status: model.last_status.parse().unwrap_or_default(),
            last_error: model.last_error,
            total_runs: model.total_runs,
            success_count: model.success_count,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<ScheduledJob> for job_entity::ActiveModel {
    fn from(job: ScheduledJob) -> Self {
        Self {
            id: Set(job.id),
            name: Set(job.name),
            tld: Set(job.tld),
            cron_hour: Set(job.cron_hour),
            cron_minute: Set(job.cron_minute),
            job_type: Set(job.job_type.to_string()),
            is_enabled: Set(job.is_enabled),
            priority: Set(job.priority),
            timeout_minutes: Set(job.timeout_minutes),
            retry_count: Set(job.retry_count),
            last_run_at: Set(job.last_run_at.map(Into::into)),
            next_run_at: Set(job.next_run_at.map(Into::into)),
            last_status: Set(job.last_status.to_string()),
            last_error: Set(job.last_error),
            total_runs: Set(job.total_runs),
            success_count: Set(job.success_count),
            created_at: Set(job.created_at.into()),
            updated_at: Set(job.updated_at.into()),
        }
    }
}

#[async_trait]
impl ScheduledJobRepository for ScheduledJobRepoImpl {
    async fn create(&self, job: &ScheduledJob) -> Result<ScheduledJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();
        let saved = model.insert(self.db.as_ref()).await?;
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledJob>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_tld(&self, tld: &str) -> Result<Option<ScheduledJob>, RepositoryError> {
        let model = job_entity::Entity::find()
            .filter(job_entity::Column::Tld.eq(tld))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<ScheduledJob>, RepositoryError> {
        let models = job_entity::Entity::find()
            .order_by_asc(job_entity::Column::Priority)
            .order_by_asc(job_entity::Column::CronHour)
            .order_by_asc(job_entity::Column::CronMinute)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_enabled(&self) -> Result<Vec<ScheduledJob>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::IsEnabled.eq(true))
            .order_by_asc(job_entity::Column::Priority)
            .order_by_asc(job_entity::Column::CronHour)
            .order_by_asc(job_entity::Column::CronMinute)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, job: &ScheduledJob) -> Result<ScheduledJob, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();
        match model.update(self.db.as_ref()).await {
            Ok(saved) => Ok(saved.into()),
            Err(DbErr::RecordNotUpdated) => Err(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = job_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_enabled(&self) -> Result<u64, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::IsEnabled.eq(true))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn count_running(&self) -> Result<u64, RepositoryError> {
        let count = job_entity::Entity::find()
            .filter(job_entity::Column::LastStatus.eq(JobStatus::Running.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "scheduled_job_repo_impl_test.rs"]
mod tests;
