// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;
use zonedrop::domain::models::alert::NotificationChannel;
use zonedrop::domain::services::drop_detector::{DropPersistence, PersistenceOptions};
use zonedrop::domain::services::notification_service::NotificationSink;
use zonedrop::domain::services::watchlist_matcher::{MatcherOptions, WatchlistMatcher};
use zonedrop::infrastructure::database::connection::connect_in_memory;
use zonedrop::infrastructure::repositories::dropped_domain_repo_impl::DroppedDomainRepoImpl;
use zonedrop::infrastructure::repositories::job_run_log_repo_impl::JobRunLogRepoImpl;
use zonedrop::infrastructure::repositories::scheduled_job_repo_impl::ScheduledJobRepoImpl;
use zonedrop::infrastructure::repositories::tld_repo_impl::TldRepoImpl;
use zonedrop::infrastructure::repositories::watchlist_repo_impl::WatchlistRepoImpl;
use zonedrop::infrastructure::services::file_zone_source::FileZoneSource;
use zonedrop::utils::errors::NotificationError;
use zonedrop::workers::PipelineOrchestrator;

/// 记录每次发送的通知下游
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<SentNotification>>,
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub owner_id: Uuid,
    pub channel: NotificationChannel,
    pub subject: String,
    pub data: serde_json::Value,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(
        &self,
        owner_id: Uuid,
        channel: NotificationChannel,
        subject: &str,
        _message: &str,
        data: &serde_json::Value,
    ) -> Result<(), NotificationError> {
        self.sent.lock().push(SentNotification {
            owner_id,
            channel,
            subject: subject.to_string(),
            data: data.clone(),
        });
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub jobs: Arc<ScheduledJobRepoImpl>,
    pub logs: Arc<JobRunLogRepoImpl>,
    pub domains: Arc<DroppedDomainRepoImpl>,
    pub tlds: Arc<TldRepoImpl>,
    pub watchlists: Arc<WatchlistRepoImpl>,
    pub sink: Arc<RecordingSink>,
    pub orchestrator: Arc<PipelineOrchestrator>,
    // Keep the zone directory alive
    pub zone_dir: TempDir,
}

impl TestApp {
    /// 写入一份区域快照到 `zones/<tld>/<YYYYMMDD>.zone`
    pub fn write_snapshot(&self, tld: &str, date: NaiveDate, labels: &[&str]) -> PathBuf {
        let dir = self.zone_dir.path().join("zones").join(tld);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.zone", date.format("%Y%m%d")));
        std::fs::write(&path, zone_text(tld, labels)).unwrap();
        path
    }
}

/// 生成包含 SOA、注释与 NS 记录的区域文件文本
pub fn zone_text(tld: &str, labels: &[&str]) -> String {
    let mut text = format!(
        "; {} zone snapshot\n{}. 86400 IN SOA a.nic.{}. hostmaster. 1 1800 900 604800 86400\n",
        tld, tld, tld
    );
    for label in labels {
        text.push_str(&format!("{}.{}. 172800 IN NS ns1.example.net.\n", label, tld));
        text.push_str(&format!("{}.{}. 172800 IN NS ns2.example.net.\n", label, tld));
    }
    text
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let db = Arc::new(connect_in_memory().await.unwrap());
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub async fn create_test_app() -> TestApp {
    let db = create_test_db().await;
    let jobs = Arc::new(ScheduledJobRepoImpl::new(db.clone()));
    let logs = Arc::new(JobRunLogRepoImpl::new(db.clone()));
    let domains = Arc::new(DroppedDomainRepoImpl::new(db.clone()));
    let tlds = Arc::new(TldRepoImpl::new(db.clone()));
    let watchlists = Arc::new(WatchlistRepoImpl::new(db.clone()));
    let sink = Arc::new(RecordingSink::default());
    let zone_dir = tempfile::tempdir().unwrap();

    let persistence = Arc::new(DropPersistence::new(
        domains.clone(),
        tlds.clone(),
        PersistenceOptions {
            batch_size: 2,
            ..Default::default()
        },
    ));
    let matcher = Arc::new(WatchlistMatcher::new(
        watchlists.clone(),
        sink.clone(),
        MatcherOptions::default(),
    ));
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        jobs.clone(),
        logs.clone(),
        Arc::new(FileZoneSource::new(zone_dir.path())),
        persistence,
        matcher,
        100,
    ));

    TestApp {
        db,
        jobs,
        logs,
        domains,
        tlds,
        watchlists,
        sink,
        orchestrator,
        zone_dir,
    }
}
