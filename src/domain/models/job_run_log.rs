// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 任务运行日志
///
/// 运行开始时创建（状态预设为 success），结束时补全。只追加不删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRunLog {
    pub id: Uuid,
    /// 所属任务
    pub job_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    /// 当日快照中的标签数量
    pub domains_found: i64,
    /// 检测到的掉落数量
    pub drops_detected: i64,
    /// 处理的区域文件大小（字节）
    pub file_size_bytes: i64,
    pub error_message: Option<String>,
    /// 执行耗时（秒）
    pub execution_seconds: i64,
}

impl JobRunLog {
    /// 为任务开启一条新的运行日志
    pub fn start(job_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Success,
            domains_found: 0,
            drops_detected: 0,
            file_size_bytes: 0,
            error_message: None,
            execution_seconds: 0,
        }
    }

    /// 结束运行，写入结束时间与耗时
    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
        self.execution_seconds = (finished_at - self.started_at).num_seconds().max(0);
    }
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Success,
    Failed,
    Timeout,
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Timeout => write!(f, "timeout"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RunStatus::Success),
            "failed" => Ok(RunStatus::Failed),
            "timeout" => Ok(RunStatus::Timeout),
            "cancelled" => Ok(RunStatus::Cancelled),
            other => Err(format!("unknown run status: {}", other)),
        }
    }
}
