// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduled_job::ScheduledJob;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 定时任务仓库特质
///
/// 定义定时任务数据访问接口
#[async_trait]
pub trait ScheduledJobRepository: Send + Sync {
    /// 创建任务，顶级域名重复时返回 `Conflict`
    async fn create(&self, job: &ScheduledJob) -> Result<ScheduledJob, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduledJob>, RepositoryError>;
    /// 根据顶级域名查找任务
    async fn find_by_tld(&self, tld: &str) -> Result<Option<ScheduledJob>, RepositoryError>;
    /// 列出所有任务，按优先级、小时、分钟升序
    async fn list(&self) -> Result<Vec<ScheduledJob>, RepositoryError>;
    /// 列出所有启用的任务
    async fn find_enabled(&self) -> Result<Vec<ScheduledJob>, RepositoryError>;
    /// 更新任务
    async fn update(&self, job: &ScheduledJob) -> Result<ScheduledJob, RepositoryError>;
    /// 删除任务，返回是否存在
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
    /// 统计启用的任务数量
    async fn count_enabled(&self) -> Result<u64, RepositoryError>;
    /// 统计正在运行的任务数量
    async fn count_running(&self) -> Result<u64, RepositoryError>;
}
