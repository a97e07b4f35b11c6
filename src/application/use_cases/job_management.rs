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

use crate::application::dto::job_request::{
    BulkCreateJobsRequest, CreateJobRequest, UpdateJobRequest,
};
use crate::domain::models::job_run_log::{JobRunLog, RunStatus};
use crate::domain::models::scheduled_job::ScheduledJob;
use crate::domain::models::tld::normalize_tld;
use crate::domain::repositories::job_run_log_repository::JobRunLogRepository;
use crate::domain::repositories::scheduled_job_repository::ScheduledJobRepository;
use crate::queue::scheduler::{calculate_next_run, JobScheduler};
use crate::utils::errors::{DomainError, RepositoryError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// 批量创建结果
#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateResult {
    pub created: Vec<ScheduledJob>,
    /// 已有任务而跳过的顶级域名
    pub skipped: Vec<String>,
}

/// 立即运行的受理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunTriggered {
    pub job_id: Uuid,
    pub status: &'static str,
}

/// 调度器概况
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerOverview {
    pub running: bool,
    pub scheduled_jobs: usize,
    pub next_job_id: Option<Uuid>,
    pub next_run_time: Option<DateTime<Utc>>,
    pub enabled_jobs: u64,
    pub running_jobs: u64,
}

/// 计算批量创建中第 `index` 个任务的 (小时, 分钟)
pub fn stagger_slot(start_hour: i32, interval_minutes: i32, index: usize) -> (i32, i32) {
    let slot = i64::from(start_hour) * 60 + index as i64 * i64::from(interval_minutes);
    (((slot / 60) % 24) as i32, (slot % 60) as i32)
}

fn next_run_for(hour: i32, minute: i32) -> Result<DateTime<Utc>, DomainError> {
    let hour = u32::try_from(hour)
        .map_err(|_| DomainError::ValidationError(format!("invalid hour {}", hour)))?;
    let minute = u32::try_from(minute)
        .map_err(|_| DomainError::ValidationError(format!("invalid minute {}", minute)))?;
    Ok(calculate_next_run(hour, minute, Utc::now())?)
}

/// 定时任务管理用例
///
/// 对外部调用方暴露的手动触发面：增删改查、启停、批量创建、立即运行与日志查询。
/// 数据库中的任务与调度器中的调度表在每次变更后保持一致
pub struct JobManagementUseCase {
    jobs: Arc<dyn ScheduledJobRepository>,
    logs: Arc<dyn JobRunLogRepository>,
    scheduler: Arc<JobScheduler>,
}

impl JobManagementUseCase {
    pub fn new(
        jobs: Arc<dyn ScheduledJobRepository>,
        logs: Arc<dyn JobRunLogRepository>,
        scheduler: Arc<JobScheduler>,
    ) -> Self {
        Self {
            jobs,
            logs,
            scheduler,
        }
    }

    /// 创建定时任务
    ///
    /// 每个顶级域名只允许一个任务
    ///
    /// # 参数
    ///
    /// * `request` - 创建请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ScheduledJob)` - 新建的任务
    /// * `Err(DomainError)` - 校验失败或任务已存在
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<ScheduledJob, DomainError> {
        request
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let tld = normalize_tld(&request.tld);
        if tld.is_empty() {
            return Err(DomainError::ValidationError("tld must not be empty".to_string()));
        }
        if self.jobs.find_by_tld(&tld).await?.is_some() {
            return Err(DomainError::AlreadyExists(format!("job for .{}", tld)));
        }

        let mut job = ScheduledJob::new(request.name, tld, request.hour, request.minute);
        job.job_type = request.job_type;
        job.is_enabled = request.is_enabled;
        job.priority = request.priority;
        job.timeout_minutes = request.timeout_minutes;
        job.retry_count = request.retry_count;
        job.next_run_at = Some(next_run_for(job.cron_hour, job.cron_minute)?);

        let job = self.insert(job).await?;
        self.sync_schedule(&job)?;
        info!(job_id = %job.id, tld = %job.tld, "Scheduled job created");
        Ok(job)
    }

    async fn insert(&self, job: ScheduledJob) -> Result<ScheduledJob, DomainError> {
        match self.jobs.create(&job).await {
            Ok(job) => Ok(job),
            Err(RepositoryError::Conflict(_)) => {
                Err(DomainError::AlreadyExists(format!("job for .{}", job.tld)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 按任务状态同步调度表
    fn sync_schedule(&self, job: &ScheduledJob) -> Result<(), DomainError> {
        if job.is_enabled {
            let hour = u32::try_from(job.cron_hour).unwrap_or(u32::MAX);
            let minute = u32::try_from(job.cron_minute).unwrap_or(u32::MAX);
            self.scheduler.add_job(job.id, hour, minute)?;
        } else {
            self.scheduler.remove_job(job.id);
        }
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<ScheduledJob, DomainError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("job {}", id)))
    }

    /// 更新定时任务
    pub async fn update_job(
        &self,
        id: Uuid,
        request: UpdateJobRequest,
    ) -> Result<ScheduledJob, DomainError> {
        request
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let mut job = self.get_job(id).await?;
        if let Some(name) = request.name {
            job.name = name;
        }
        if let Some(hour) = request.hour {
            job.cron_hour = hour;
        }
        if let Some(minute) = request.minute {
            job.cron_minute = minute;
        }
        if let Some(job_type) = request.job_type {
            job.job_type = job_type;
        }
        if let Some(is_enabled) = request.is_enabled {
            job.is_enabled = is_enabled;
        }
        if let Some(priority) = request.priority {
            job.priority = priority;
        }
        if let Some(timeout_minutes) = request.timeout_minutes {
            job.timeout_minutes = timeout_minutes;
        }
        if let Some(retry_count) = request.retry_count {
            job.retry_count = retry_count;
        }
        job.next_run_at = Some(next_run_for(job.cron_hour, job.cron_minute)?);
        job.updated_at = Utc::now();

        let job = self.jobs.update(&job).await?;
        self.sync_schedule(&job)?;
        Ok(job)
    }

    /// 删除定时任务及其运行日志
    pub async fn delete_job(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.jobs.delete(id).await? {
            return Err(DomainError::NotFound(format!("job {}", id)));
        }
        self.scheduler.remove_job(id);
        info!(job_id = %id, "Scheduled job deleted");
        Ok(())
    }

    /// 启用或停用任务
    pub async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<ScheduledJob, DomainError> {
        let mut job = self.get_job(id).await?;
        job.is_enabled = enabled;
        job.updated_at = Utc::now();
        let job = self.jobs.update(&job).await?;
        self.sync_schedule(&job)?;
        info!(job_id = %id, enabled, "Scheduled job toggled");
        Ok(job)
    }

    /// 切换任务的启用状态
    pub async fn toggle_job(&self, id: Uuid) -> Result<ScheduledJob, DomainError> {
        let job = self.get_job(id).await?;
        self.set_enabled(id, !job.is_enabled).await
    }

    /// 批量创建任务并错开运行时间
    ///
    /// 已有任务的顶级域名被跳过且不占用时间槽
    pub async fn bulk_create(
        &self,
        request: BulkCreateJobsRequest,
    ) -> Result<BulkCreateResult, DomainError> {
        request
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let mut result = BulkCreateResult {
            created: Vec::new(),
            skipped: Vec::new(),
        };

        for raw in &request.tlds {
            let tld = normalize_tld(raw);
            if tld.is_empty() {
                continue;
            }
            if self.jobs.find_by_tld(&tld).await?.is_some() {
                result.skipped.push(tld);
                continue;
            }

            let (hour, minute) = stagger_slot(
                request.start_hour,
                request.interval_minutes,
                result.created.len(),
            );
            let mut job = ScheduledJob::new(format!("{} daily", tld), tld, hour, minute);
            job.job_type = request.job_type;
            job.priority = request.priority;
            job.next_run_at = Some(next_run_for(hour, minute)?);

            let job = self.insert(job).await?;
            self.sync_schedule(&job)?;
            result.created.push(job);
        }

        info!(
            created = result.created.len(),
            skipped = result.skipped.len(),
            "Bulk job creation finished"
        );
        Ok(result)
    }

    /// 立即运行任务
    ///
    /// 只投递执行请求，不等待完成
    pub async fn run_now(&self, id: Uuid) -> Result<RunTriggered, DomainError> {
        let job = self.get_job(id).await?;
        self.scheduler.run_now(job.id).await?;
        Ok(RunTriggered {
            job_id: job.id,
            status: "started",
        })
    }

    /// 按优先级、小时、分钟升序列出任务
    pub async fn list_jobs(&self) -> Result<Vec<ScheduledJob>, DomainError> {
        Ok(self.jobs.list().await?)
    }

    /// 任务的最近运行日志
    pub async fn job_logs(&self, id: Uuid, limit: u64) -> Result<Vec<JobRunLog>, DomainError> {
        self.get_job(id).await?;
        Ok(self.logs.find_by_job(id, limit).await?)
    }

    /// 全部运行日志，可按状态过滤
    pub async fn all_logs(
        &self,
        status: Option<RunStatus>,
        limit: u64,
    ) -> Result<Vec<JobRunLog>, DomainError> {
        Ok(self.logs.list(status, limit).await?)
    }

    pub async fn scheduler_status(&self) -> Result<SchedulerOverview, DomainError> {
        let status = self.scheduler.status();
        Ok(SchedulerOverview {
            running: status.running,
            scheduled_jobs: status.job_count,
            next_job_id: status.next_job_id,
            next_run_time: status.next_run_time,
            enabled_jobs: self.jobs.count_enabled().await?,
            running_jobs: self.jobs.count_running().await?,
        })
    }

    /// 启动时把所有启用的任务载入调度器
    ///
    /// # 返回值
    ///
    /// 成功载入的任务数
    pub async fn initialize_scheduler(&self) -> Result<usize, DomainError> {
        let mut loaded = 0;
        for mut job in self.jobs.find_enabled().await? {
            let next_run = match self.sync_schedule(&job) {
                Ok(()) => self.scheduler.job_info(job.id).map(|e| e.next_run),
                Err(e) => {
                    warn!(job_id = %job.id, tld = %job.tld, "Skipping job with bad schedule: {}", e);
                    continue;
                }
            };
            if job.next_run_at != next_run {
                job.next_run_at = next_run;
                self.jobs.update(&job).await?;
            }
            loaded += 1;
        }
        info!(jobs = loaded, "Scheduler initialized from enabled jobs");
        Ok(loaded)
    }
}

#[cfg(test)]
#[path = "job_management_test.rs"]
mod tests;
