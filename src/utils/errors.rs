// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(DbErr),
    /// 唯一约束冲突
    #[error("Unique constraint violated: {0}")]
    Conflict(String),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Conflict(detail),
            _ => RepositoryError::Database(err),
        }
    }
}

impl RepositoryError {
    /// 是否为唯一约束冲突
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }
}

/// 区域文件来源错误类型
#[derive(Error, Debug)]
pub enum ZoneSourceError {
    /// 指定日期的快照不可用
    #[error("Zone snapshot unavailable for {tld} on {date}")]
    Unavailable { tld: String, date: chrono::NaiveDate },
    /// 读取失败
    #[error("Zone source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("验证错误: {0}")]
    ValidationError(String),

    #[error("数据已存在: {0}")]
    AlreadyExists(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("仓库错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("调度错误: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// 流水线执行错误类型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Zone source error: {0}")]
    ZoneSource(#[from] ZoneSourceError),

    #[error("Execution exceeded {0} minute timeout")]
    Timeout(i32),
}

/// 调度器错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid schedule {hour}:{minute}")]
    InvalidSchedule { hour: u32, minute: u32 },

    #[error("Job {0} is not scheduled")]
    NotScheduled(Uuid),

    #[error("Dispatch channel closed")]
    ChannelClosed,
}
