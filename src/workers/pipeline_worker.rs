// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job_run_log::{JobRunLog, RunStatus};
use crate::domain::models::scheduled_job::{JobStatus, ScheduledJob};
use crate::domain::repositories::job_run_log_repository::JobRunLogRepository;
use crate::domain::repositories::scheduled_job_repository::ScheduledJobRepository;
use crate::domain::services::drop_detector::{compute_dropped, DropPersistence};
use crate::domain::services::watchlist_matcher::WatchlistMatcher;
use crate::domain::services::zone_parser::extract_labels_chunked;
use crate::domain::services::zone_source::ZoneSource;
use crate::queue::scheduler::calculate_next_run;
use crate::utils::errors::{PipelineError, ZoneSourceError};
use crate::workers::manager::JobDispatcher;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 单次运行中各阶段累计的统计
#[derive(Debug, Default)]
struct StageStats {
    file_size_bytes: i64,
    domains_found: i64,
    drops_detected: i64,
}

/// 流水线编排器
///
/// 调度器的分发目标：下载、解析、比对、持久化、匹配与通知，并记录运行日志
pub struct PipelineOrchestrator {
    jobs: Arc<dyn ScheduledJobRepository>,
    logs: Arc<dyn JobRunLogRepository>,
    zone_source: Arc<dyn ZoneSource>,
    persistence: Arc<DropPersistence>,
    matcher: Arc<WatchlistMatcher>,
    parse_chunk_size: usize,
}

impl PipelineOrchestrator {
    /// 创建新的流水线编排器
    ///
    /// # 参数
    ///
    /// * `jobs` - 定时任务仓库
    /// * `logs` - 运行日志仓库
    /// * `zone_source` - 区域快照来源
    /// * `persistence` - 掉落域名持久化服务
    /// * `matcher` - 关注列表匹配器
    /// * `parse_chunk_size` - 解析时每多少个新标签让出一次运行时
    pub fn new(
        jobs: Arc<dyn ScheduledJobRepository>,
        logs: Arc<dyn JobRunLogRepository>,
        zone_source: Arc<dyn ZoneSource>,
        persistence: Arc<DropPersistence>,
        matcher: Arc<WatchlistMatcher>,
        parse_chunk_size: usize,
    ) -> Self {
        Self {
            jobs,
            logs,
            zone_source,
            persistence,
            matcher,
            parse_chunk_size,
        }
    }

    /// 以今天（UTC）为快照日期执行任务
    pub async fn execute(&self, job_id: Uuid) -> Result<JobRunLog, PipelineError> {
        self.execute_for_date(job_id, Utc::now().date_naive()).await
    }

    /// 以指定日期为当前快照日期执行任务
    ///
    /// 阶段内的错误与超时只记录到运行日志和任务状态，不作为返回错误；
    /// 只有任务不存在或写日志/任务状态失败时返回 `Err`
    ///
    /// # 返回值
    ///
    /// * `Ok(JobRunLog)` - 已结束的运行日志
    /// * `Err(PipelineError)` - 任务不存在或仓库错误
    pub async fn execute_for_date(
        &self,
        job_id: Uuid,
        date: NaiveDate,
    ) -> Result<JobRunLog, PipelineError> {
        let mut job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(PipelineError::JobNotFound(job_id))?;

        let mut log = JobRunLog::start(job.id);
        self.logs.create(&log).await?;

        job.last_status = JobStatus::Running;
        job.last_run_at = Some(log.started_at);
        job.updated_at = Utc::now();
        let mut job = match self.jobs.update(&job).await {
            Ok(job) => job,
            Err(e) => {
                error!(%job_id, "Failed to mark job running: {}", e);
                log.status = RunStatus::Failed;
                log.error_message = Some(e.to_string());
                log.finish(Utc::now());
                if let Err(log_err) = self.logs.update(&log).await {
                    error!(%job_id, "Failed to close run log: {}", log_err);
                }
                return Err(e.into());
            }
        };

        info!(%job_id, tld = %job.tld, job_type = %job.job_type, %date, "Pipeline run started");

        let mut stats = StageStats::default();
        let budget = std::time::Duration::from_secs(job.timeout_minutes.max(1) as u64 * 60);
        let outcome =
            tokio::time::timeout(budget, self.run_stages(&job, date, &mut stats)).await;

        match outcome {
            Ok(Ok(())) => {
                log.status = RunStatus::Success;
                job.last_status = JobStatus::Success;
                job.last_error = None;
                job.success_count += 1;
            }
            Ok(Err(e)) => {
                error!(%job_id, tld = %job.tld, "Pipeline run failed: {}", e);
                log.status = RunStatus::Failed;
                log.error_message = Some(e.to_string());
                job.last_status = JobStatus::Failed;
                job.last_error = Some(e.to_string());
            }
            Err(_) => {
                let e = PipelineError::Timeout(job.timeout_minutes);
                error!(%job_id, tld = %job.tld, "Pipeline run timed out: {}", e);
                log.status = RunStatus::Timeout;
                log.error_message = Some(e.to_string());
                job.last_status = JobStatus::Failed;
                job.last_error = Some(e.to_string());
            }
        }

        self.finalize(&mut job, &mut log, stats).await?;
        Ok(log)
    }

    async fn finalize(
        &self,
        job: &mut ScheduledJob,
        log: &mut JobRunLog,
        stats: StageStats,
    ) -> Result<(), PipelineError> {
        let now = Utc::now();
        log.file_size_bytes = stats.file_size_bytes;
        log.domains_found = stats.domains_found;
        log.drops_detected = stats.drops_detected;
        log.finish(now);
        // the job row is written even when the log write fails
        let log_written = self.logs.update(log).await;
        if let Err(e) = &log_written {
            error!(job_id = %job.id, "Failed to finalize run log: {}", e);
        }

        job.total_runs += 1;
        job.next_run_at = match (u32::try_from(job.cron_hour), u32::try_from(job.cron_minute)) {
            (Ok(hour), Ok(minute)) => calculate_next_run(hour, minute, now).ok(),
            _ => None,
        };
        job.updated_at = now;
        let job_written = self.jobs.update(job).await;
        if let Err(e) = &job_written {
            error!(job_id = %job.id, "Failed to update job statistics: {}", e);
        }

        counter!("zonedrop_job_runs_total", "status" => log.status.to_string()).increment(1);
        histogram!("zonedrop_job_duration_seconds").record(log.execution_seconds as f64);
        info!(
            job_id = %job.id,
            tld = %job.tld,
            status = %log.status,
            domains_found = log.domains_found,
            drops_detected = log.drops_detected,
            seconds = log.execution_seconds,
            "Pipeline run finished"
        );
        log_written?;
        job_written?;
        Ok(())
    }

    async fn run_stages(
        &self,
        job: &ScheduledJob,
        date: NaiveDate,
        stats: &mut StageStats,
    ) -> Result<(), PipelineError> {
        if !self.persistence.is_tld_active(&job.tld).await? {
            info!(tld = %job.tld, "Top-level domain is inactive, skipping run");
            return Ok(());
        }

        if job.job_type.needs_download() {
            match self.zone_source.download(&job.tld, date).await {
                Ok(size) => stats.file_size_bytes = i64::try_from(size).unwrap_or(i64::MAX),
                Err(ZoneSourceError::Unavailable { .. }) => {
                    warn!(tld = %job.tld, %date, "Zone snapshot unavailable, skipping run");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !job.job_type.needs_parse() {
            return Ok(());
        }

        let Some(current) = self.fetch_snapshot(&job.tld, date).await? else {
            return Ok(());
        };
        if stats.file_size_bytes == 0 {
            stats.file_size_bytes = current.len() as i64;
        }
        let current_labels =
            extract_labels_chunked(&current, &job.tld, self.parse_chunk_size).await;
        drop(current);
        stats.domains_found = current_labels.len() as i64;

        let Some(previous) = self.fetch_snapshot(&job.tld, date - Duration::days(1)).await? else {
            return Ok(());
        };
        let previous_labels =
            extract_labels_chunked(&previous, &job.tld, self.parse_chunk_size).await;
        drop(previous);

        let dropped = compute_dropped(&previous_labels, &current_labels);
        stats.drops_detected = dropped.len() as i64;
        info!(tld = %job.tld, %date, drops = dropped.len(), "Drop detection finished");

        let outcome = self.persistence.persist(&job.tld, date, &dropped).await?;

        if !outcome.persisted.is_empty() {
            if let Err(e) = self.matcher.match_and_notify(&outcome.persisted).await {
                error!(tld = %job.tld, "Watchlist matching failed: {}", e);
            }
        }
        Ok(())
    }

    /// 读取快照；快照不存在时返回 `None`
    async fn fetch_snapshot(
        &self,
        tld: &str,
        date: NaiveDate,
    ) -> Result<Option<String>, PipelineError> {
        match self.zone_source.fetch(tld, date).await {
            Ok(text) => Ok(Some(text)),
            Err(ZoneSourceError::Unavailable { .. }) => {
                warn!(tld, %date, "Zone snapshot unavailable, skipping drop detection");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl JobDispatcher for PipelineOrchestrator {
    async fn dispatch(&self, job_id: Uuid) {
        if let Err(e) = self.execute(job_id).await {
            error!(%job_id, "Pipeline dispatch failed: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_worker_test.rs"]
mod tests;
