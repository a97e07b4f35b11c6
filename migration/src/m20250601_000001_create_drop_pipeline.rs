// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 掉落检测流水线初始模式迁移
///
/// 创建 TLD、掉落域名、关注列表、定时任务以及任务运行日志表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. tlds (name is the natural key)
        manager
            .create_table(
                Table::create()
                    .table(Tlds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tlds::Name).string_len(50).not_null().primary_key())
                    .col(ColumnDef::new(Tlds::DisplayName).string_len(100))
                    .col(
                        ColumnDef::new(Tlds::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Tlds::LastImportDate).date())
                    .col(
                        ColumnDef::new(Tlds::LastDropCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tlds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Tlds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. dropped_domains (depends on tlds)
        manager
            .create_table(
                Table::create()
                    .table(DroppedDomains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DroppedDomains::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DroppedDomains::Domain)
                            .string_len(191)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DroppedDomains::Tld).string_len(50).not_null())
                    .col(ColumnDef::new(DroppedDomains::DropDate).date().not_null())
                    .col(ColumnDef::new(DroppedDomains::Length).integer().not_null())
                    .col(
                        ColumnDef::new(DroppedDomains::LabelCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(DroppedDomains::CharsetType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DroppedDomains::QualityScore).integer())
                    .col(
                        ColumnDef::new(DroppedDomains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dropped_domains_tld")
                            .from(DroppedDomains::Table, DroppedDomains::Tld)
                            .to(Tlds::Table, Tlds::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Same domain cannot be dropped twice on the same date
        manager
            .create_index(
                Index::create()
                    .name("idx_dropped_domains_domain_drop_date")
                    .table(DroppedDomains::Table)
                    .col(DroppedDomains::Domain)
                    .col(DroppedDomains::DropDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dropped_domains_tld_drop_date")
                    .table(DroppedDomains::Table)
                    .col(DroppedDomains::Tld)
                    .col(DroppedDomains::DropDate)
                    .to_owned(),
            )
            .await?;

        // 3. watchlists
        manager
            .create_table(
                Table::create()
                    .table(Watchlists::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Watchlists::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Watchlists::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Watchlists::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Watchlists::DomainPattern).string_len(255))
                    .col(ColumnDef::new(Watchlists::TldFilter).string_len(255))
                    .col(ColumnDef::new(Watchlists::MinLength).integer())
                    .col(ColumnDef::new(Watchlists::MaxLength).integer())
                    .col(ColumnDef::new(Watchlists::CharsetFilter).string_len(20))
                    .col(ColumnDef::new(Watchlists::MinQualityScore).integer())
                    .col(
                        ColumnDef::new(Watchlists::NotifyEmail)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Watchlists::NotifyTelegram)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Watchlists::NotifyDiscord)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Watchlists::NotifyWebhook)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Watchlists::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Watchlists::LastNotifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Watchlists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Watchlists::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watchlists_owner_id")
                    .table(Watchlists::Table)
                    .col(Watchlists::OwnerId)
                    .to_owned(),
            )
            .await?;

        // 4. scheduled_jobs (one job per TLD)
        manager
            .create_table(
                Table::create()
                    .table(ScheduledJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduledJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduledJobs::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ScheduledJobs::Tld).string_len(50).not_null())
                    .col(
                        ColumnDef::new(ScheduledJobs::CronHour)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::CronMinute)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::JobType)
                            .string_len(20)
                            .not_null()
                            .default("full"),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::Priority)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::TimeoutMinutes)
                            .integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::RetryCount)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(ColumnDef::new(ScheduledJobs::LastRunAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScheduledJobs::NextRunAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ScheduledJobs::LastStatus)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ScheduledJobs::LastError).text())
                    .col(
                        ColumnDef::new(ScheduledJobs::TotalRuns)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::SuccessCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ScheduledJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scheduled_jobs_tld")
                    .table(ScheduledJobs::Table)
                    .col(ScheduledJobs::Tld)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 5. job_run_logs (depends on scheduled_jobs)
        manager
            .create_table(
                Table::create()
                    .table(JobRunLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JobRunLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(JobRunLogs::JobId).uuid().not_null())
                    .col(
                        ColumnDef::new(JobRunLogs::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobRunLogs::FinishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(JobRunLogs::Status)
                            .string_len(20)
                            .not_null()
                            .default("success"),
                    )
                    .col(
                        ColumnDef::new(JobRunLogs::DomainsFound)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(JobRunLogs::DropsDetected)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(JobRunLogs::FileSizeBytes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(JobRunLogs::ErrorMessage).text())
                    .col(
                        ColumnDef::new(JobRunLogs::ExecutionSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_run_logs_job")
                            .from(JobRunLogs::Table, JobRunLogs::JobId)
                            .to(ScheduledJobs::Table, ScheduledJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_run_logs_job_started")
                    .table(JobRunLogs::Table)
                    .col(JobRunLogs::JobId)
                    .col(JobRunLogs::StartedAt)
                    .to_owned(),
            )
            .await
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobRunLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScheduledJobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Watchlists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DroppedDomains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tlds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tlds {
    Table,
    Name,
    DisplayName,
    IsActive,
    LastImportDate,
    LastDropCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DroppedDomains {
    Table,
    Id,
    Domain,
    Tld,
    DropDate,
    Length,
    LabelCount,
    CharsetType,
    QualityScore,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Watchlists {
    Table,
    Id,
    OwnerId,
    Name,
    DomainPattern,
    TldFilter,
    MinLength,
    MaxLength,
    CharsetFilter,
    MinQualityScore,
    NotifyEmail,
    NotifyTelegram,
    NotifyDiscord,
    NotifyWebhook,
    IsActive,
    LastNotifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ScheduledJobs {
    Table,
    Id,
    Name,
    Tld,
    CronHour,
    CronMinute,
    JobType,
    IsEnabled,
    Priority,
    TimeoutMinutes,
    RetryCount,
    LastRunAt,
    NextRunAt,
    LastStatus,
    LastError,
    TotalRuns,
    SuccessCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobRunLogs {
    Table,
    Id,
    JobId,
    StartedAt,
    FinishedAt,
    Status,
    DomainsFound,
    DropsDetected,
    FileSizeBytes,
    ErrorMessage,
    ExecutionSeconds,
}
