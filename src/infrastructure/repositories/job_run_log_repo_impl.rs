// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job_run_log::{JobRunLog, RunStatus};
use crate::domain::repositories::job_run_log_repository::JobRunLogRepository;
use crate::infrastructure::database::entities::job_run_log;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 运行日志仓库实现
#[derive(Clone)]
pub struct JobRunLogRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl JobRunLogRepoImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<&JobRunLog> for job_run_log::ActiveModel {
    fn from(log: &JobRunLog) -> Self {
        Self {
            id: Set(log.id),
            job_id: Set(log.job_id),
            started_at: Set(log.started_at.into()),
            finished_at: Set(log.finished_at.map(Into::into)),
            status: Set(log.status.to_string()),
            domains_found: Set(log.domains_found),
            drops_detected: Set(log.drops_detected),
            file_size_bytes: Set(log.file_size_bytes),
            error_message: Set(log.error_message.clone()),
            execution_seconds: Set(log.execution_seconds),
        }
    }
}

#[async_trait]
impl JobRunLogRepository for JobRunLogRepoImpl {
    async fn create(&self, log: &JobRunLog) -> Result<JobRunLog, RepositoryError> {
        let saved = job_run_log::ActiveModel::from(log)
            .insert(self.db.as_ref())
            .await?;
        Ok(saved.into())
    }

    async fn update(&self, log: &JobRunLog) -> Result<JobRunLog, RepositoryError> {
        match job_run_log::ActiveModel::from(log)
            .update(self.db.as_ref())
            .await
        {
            Ok(saved) => Ok(saved.into()),
            Err(DbErr::RecordNotUpdated) => Err(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_job(
        &self,
        job_id: Uuid,
        limit: u64,
    ) -> Result<Vec<JobRunLog>, RepositoryError> {
        let models = job_run_log::Entity::find()
            .filter(job_run_log::Column::JobId.eq(job_id))
            .order_by_desc(job_run_log::Column::StartedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list(
        &self,
        status: Option<RunStatus>,
        limit: u64,
    ) -> Result<Vec<JobRunLog>, RepositoryError> {
        let mut query = job_run_log::Entity::find();
        if let Some(status) = status {
            query = query.filter(job_run_log::Column::Status.eq(status.to_string()));
        }
        let models = query
            .order_by_desc(job_run_log::Column::StartedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

impl From<job_run_log::Model> for JobRunLog {
    fn from(model: job_run_log::Model) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            started_at: model.started_at.into(),
            finished_at: model.finished_at.map(Into::into),
            status: model.status.parse().unwrap_or_default(),
            domains_found: model.domains_found,
            drops_detected: model.drops_detected,
            file_size_bytes: model.file_size_bytes,
            error_message: model.error_message,
            execution_seconds: model.execution_seconds,
        }
    }
}

#[cfg(test)]
#[path = "job_run_log_repo_impl_test.rs"]
mod tests;
