// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job_run_log::{JobRunLog, RunStatus};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 任务运行日志仓库特质
#[async_trait]
pub trait JobRunLogRepository: Send + Sync {
    /// 创建运行日志
    async fn create(&self, log: &JobRunLog) -> Result<JobRunLog, RepositoryError>;
    /// 更新运行日志
    async fn update(&self, log: &JobRunLog) -> Result<JobRunLog, RepositoryError>;
    /// 查询某个任务的运行日志，按开始时间倒序
    async fn find_by_job(&self, job_id: Uuid, limit: u64)
        -> Result<Vec<JobRunLog>, RepositoryError>;
    /// 查询全部运行日志，可按状态过滤，按开始时间倒序
    async fn list(
        &self,
        status: Option<RunStatus>,
        limit: u64,
    ) -> Result<Vec<JobRunLog>, RepositoryError>;
}
