// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::SchedulerError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use metrics::gauge;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 计算下一次运行时间（UTC）
///
/// 若今天的 `hour:minute` 严格晚于 `now` 则返回今天，否则返回明天
///
/// # 参数
///
/// * `hour` - 小时（0-23）
/// * `minute` - 分钟（0-59）
/// * `now` - 当前时间
///
/// # 返回值
///
/// * `Ok(DateTime<Utc>)` - 下一次运行时间
/// * `Err(SchedulerError)` - 小时或分钟越界
pub fn calculate_next_run(
    hour: u32,
    minute: u32,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, SchedulerError> {
    let today = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or(SchedulerError::InvalidSchedule { hour, minute })?;
    let today = Utc.from_utc_datetime(&today);

    if today > now {
        Ok(today)
    } else {
        Ok(today + Duration::days(1))
    }
}

/// 创建调度器到工作管理器的分发通道
pub fn dispatch_channel(capacity: usize) -> (mpsc::Sender<Uuid>, mpsc::Receiver<Uuid>) {
    mpsc::channel(capacity.max(1))
}

/// 调度表中的单个任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub job_id: Uuid,
    pub hour: u32,
    pub minute: u32,
    pub next_run: DateTime<Utc>,
}

/// 调度器状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub running: bool,
    pub job_count: usize,
    pub next_job_id: Option<Uuid>,
    pub next_run_time: Option<DateTime<Utc>>,
}

type Entries = Arc<RwLock<HashMap<Uuid, ScheduleEntry>>>;

/// 每日定时任务调度器
///
/// 只保存任务 ID 与运行时间；到期时通过通道发出任务 ID，
/// 由分发方在触发时加载任务配置
pub struct JobScheduler {
    entries: Entries,
    sender: mpsc::Sender<Uuid>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl JobScheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    ///
    /// * `sender` - 到期任务 ID 的发送端
    pub fn new(sender: mpsc::Sender<Uuid>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sender,
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// 启动后台调度循环
    ///
    /// 已在运行时不做任何事
    pub fn start(&self, tick: std::time::Duration) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Scheduler already running");
            return;
        }

        let entries = self.entries.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(tick);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if fire_due(&entries, &sender, Utc::now()).is_err() {
                    error!("Dispatch channel closed, stopping scheduler loop");
                    running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        });

        *self.handle.lock() = Some(handle);
        info!(
            jobs = self.entries.read().len(),
            tick_seconds = tick.as_secs(),
            "Scheduler started"
        );
    }

    /// 停止后台调度循环
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
        info!("Scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 添加或替换任务
    ///
    /// # 返回值
    ///
    /// 任务的下一次运行时间
    pub fn add_job(
        &self,
        job_id: Uuid,
        hour: u32,
        minute: u32,
    ) -> Result<DateTime<Utc>, SchedulerError> {
        let next_run = calculate_next_run(hour, minute, Utc::now())?;
        let count = {
            let mut entries = self.entries.write();
            entries.insert(
                job_id,
                ScheduleEntry {
                    job_id,
                    hour,
                    minute,
                    next_run,
                },
            );
            entries.len()
        };
        gauge!("zonedrop_scheduled_jobs").set(count as f64);
        debug!(%job_id, hour, minute, %next_run, "Job scheduled");
        Ok(next_run)
    }

    /// 移除任务，返回任务是否存在
    pub fn remove_job(&self, job_id: Uuid) -> bool {
        let (removed, count) = {
            let mut entries = self.entries.write();
            let removed = entries.remove(&job_id).is_some();
            (removed, entries.len())
        };
        gauge!("zonedrop_scheduled_jobs").set(count as f64);
        if removed {
            debug!(%job_id, "Job unscheduled");
        }
        removed
    }

    /// 修改已调度任务的运行时间
    pub fn update_schedule(
        &self,
        job_id: Uuid,
        hour: u32,
        minute: u32,
    ) -> Result<DateTime<Utc>, SchedulerError> {
        let next_run = calculate_next_run(hour, minute, Utc::now())?;
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&job_id)
            .ok_or(SchedulerError::NotScheduled(job_id))?;
        entry.hour = hour;
        entry.minute = minute;
        entry.next_run = next_run;
        Ok(next_run)
    }

    /// 立即触发一次任务
    ///
    /// 只负责投递，不等待执行完成；任务不必在调度表中
    pub async fn run_now(&self, job_id: Uuid) -> Result<(), SchedulerError> {
        self.sender
            .send(job_id)
            .await
            .map_err(|_| SchedulerError::ChannelClosed)?;
        info!(%job_id, "Job triggered manually");
        Ok(())
    }

    pub fn job_info(&self, job_id: Uuid) -> Option<ScheduleEntry> {
        self.entries.read().get(&job_id).cloned()
    }

    /// 所有已调度任务，按下一次运行时间升序
    pub fn all_jobs(&self) -> Vec<ScheduleEntry> {
        let mut jobs: Vec<ScheduleEntry> = self.entries.read().values().cloned().collect();
        jobs.sort_by_key(|e| (e.next_run, e.job_id));
        jobs
    }

    pub fn status(&self) -> SchedulerStatus {
        let entries = self.entries.read();
        let next = entries.values().min_by_key(|e| (e.next_run, e.job_id));
        SchedulerStatus {
            running: self.is_running(),
            job_count: entries.len(),
            next_job_id: next.map(|e| e.job_id),
            next_run_time: next.map(|e| e.next_run),
        }
    }

    /// 发出 `now` 时已到期的任务并推进其下一次运行时间
    ///
    /// 错过的多次触发合并为一次
    ///
    /// # 返回值
    ///
    /// 本次发出的任务 ID
    pub fn tick(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, SchedulerError> {
        fire_due(&self.entries, &self.sender, now)
    }
}

fn fire_due(
    entries: &Entries,
    sender: &mpsc::Sender<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<Uuid>, SchedulerError> {
    let mut due: Vec<(DateTime<Utc>, Uuid)> = Vec::new();
    {
        let mut entries = entries.write();
        for entry in entries.values_mut().filter(|e| e.next_run <= now) {
            due.push((entry.next_run, entry.job_id));
            match calculate_next_run(entry.hour, entry.minute, now) {
                Ok(next_run) => entry.next_run = next_run,
                Err(e) => error!(job_id = %entry.job_id, "Cannot reschedule job: {}", e),
            }
        }
    }
    due.sort();

    let mut fired = Vec::with_capacity(due.len());
    for (_, job_id) in due {
        match sender.try_send(job_id) {
            Ok(()) => fired.push(job_id),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%job_id, "Dispatch queue full, skipping this fire");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => return Err(SchedulerError::ChannelClosed),
        }
    }
    if !fired.is_empty() {
        info!(count = fired.len(), "Dispatched due jobs");
    }
    Ok(fired)
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
