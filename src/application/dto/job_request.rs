// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scheduled_job::JobType;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    5
}

fn default_timeout_minutes() -> i32 {
    60
}

fn default_retry_count() -> i32 {
    3
}

fn default_interval_minutes() -> i32 {
    30
}

/// 创建定时任务请求DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// 顶级域名，前导点可省略
    #[validate(length(min = 1, max = 50))]
    pub tld: String,

    #[validate(range(min = 0, max = 23))]
    pub hour: i32,

    #[validate(range(min = 0, max = 59))]
    pub minute: i32,

    #[serde(default)]
    pub job_type: JobType,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,

    /// 优先级（1-10，越小越靠前）
    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 10))]
    pub priority: i32,

    #[serde(default = "default_timeout_minutes")]
    #[validate(range(min = 1, max = 1440))]
    pub timeout_minutes: i32,

    #[serde(default = "default_retry_count")]
    #[validate(range(min = 0, max = 10))]
    pub retry_count: i32,
}

impl CreateJobRequest {
    /// 以默认参数创建请求
    pub fn new(name: impl Into<String>, tld: impl Into<String>, hour: i32, minute: i32) -> Self {
        Self {
            name: name.into(),
            tld: tld.into(),
            hour,
            minute,
            job_type: JobType::default(),
            is_enabled: default_enabled(),
            priority: default_priority(),
            timeout_minutes: default_timeout_minutes(),
            retry_count: default_retry_count(),
        }
    }
}

/// 更新定时任务请求DTO
///
/// 未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(range(min = 0, max = 23))]
    pub hour: Option<i32>,

    #[validate(range(min = 0, max = 59))]
    pub minute: Option<i32>,

    pub job_type: Option<JobType>,

    pub is_enabled: Option<bool>,

    #[validate(range(min = 1, max = 10))]
    pub priority: Option<i32>,

    #[validate(range(min = 1, max = 1440))]
    pub timeout_minutes: Option<i32>,

    #[validate(range(min = 0, max = 10))]
    pub retry_count: Option<i32>,
}

/// 批量创建定时任务请求DTO
///
/// 第 i 个顶级域名的时间槽为 `start_hour * 60 + i * interval_minutes`，小时按 24 取模
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BulkCreateJobsRequest {
    #[validate(length(min = 1, max = 500))]
    pub tlds: Vec<String>,

    #[validate(range(min = 0, max = 23))]
    pub start_hour: i32,

    #[serde(default = "default_interval_minutes")]
    #[validate(range(min = 0, max = 1440))]
    pub interval_minutes: i32,

    #[serde(default)]
    pub job_type: JobType,

    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 10))]
    pub priority: i32,
}
