// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 定时任务实体
///
/// 每个顶级域名只有一个任务，每天在 hour:minute 触发。
/// 状态流转：pending → running → success / failed，
/// 失败的任务只会在下一次调度时再次执行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 任务名称
    pub name: String,
    /// 目标顶级域名（唯一）
    pub tld: String,
    /// 触发小时 (0-23)
    pub cron_hour: i32,
    /// 触发分钟 (0-59)
    pub cron_minute: i32,
    /// 任务类型，决定执行哪些阶段
    pub job_type: JobType,
    /// 是否启用
    pub is_enabled: bool,
    /// 优先级 (1-10)，仅用于列表排序，数值越小越靠前
    pub priority: i32,
    /// 超时时间（分钟）
    pub timeout_minutes: i32,
    /// 重试次数，仅作为展示给运维的元数据
    pub retry_count: i32,
    /// 最近运行时间
    pub last_run_at: Option<DateTime<Utc>>,
    /// 下次运行时间
    pub next_run_at: Option<DateTime<Utc>>,
    /// 最近状态
    pub last_status: JobStatus,
    /// 最近错误信息
    pub last_error: Option<String>,
    /// 累计运行次数
    pub total_runs: i32,
    /// 累计成功次数
    pub success_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledJob {
    /// 创建新的定时任务
    ///
    /// # 参数
    ///
    /// * `name` - 任务名称
    /// * `tld` - 目标顶级域名
    /// * `hour` - 触发小时
    /// * `minute` - 触发分钟
    ///
    /// # 返回值
    ///
    /// 使用默认优先级 5、超时 60 分钟、重试 3 次的完整流水线任务
    pub fn new(name: impl Into<String>, tld: impl Into<String>, hour: i32, minute: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tld: tld.into(),
            cron_hour: hour,
            cron_minute: minute,
            job_type: JobType::Full,
            is_enabled: true,
            priority: 5,
            timeout_minutes: 60,
            retry_count: 3,
            last_run_at: None,
            next_run_at: None,
            last_status: JobStatus::Pending,
            last_error: None,
            total_runs: 0,
            success_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 成功率（百分比）
    pub fn success_rate(&self) -> f64 {
        if self.total_runs == 0 {
            return 0.0;
        }
        f64::from(self.success_count) * 100.0 / f64::from(self.total_runs)
    }
}

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// 仅下载区域文件
    DownloadOnly,
    /// 仅解析并检测掉落
    ParseOnly,
    /// 下载并解析
    #[default]
    Full,
}

impl JobType {
    /// 是否执行下载阶段
    pub fn needs_download(&self) -> bool {
        matches!(self, JobType::DownloadOnly | JobType::Full)
    }

    /// 是否执行解析阶段
    pub fn needs_parse(&self) -> bool {
        matches!(self, JobType::ParseOnly | JobType::Full)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobType::DownloadOnly => write!(f, "download_only"),
            JobType::ParseOnly => write!(f, "parse_only"),
            JobType::Full => write!(f, "full"),
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "download_only" => Ok(JobType::DownloadOnly),
            "parse_only" => Ok(JobType::ParseOnly),
            "full" => Ok(JobType::Full),
            other => Err(format!("unknown job type: {}", other)),
        }
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "success" => Ok(JobStatus::Success),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}
