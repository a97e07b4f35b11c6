// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, date, TestApp};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use zonedrop::domain::models::alert::NotificationChannel;
use zonedrop::domain::models::dropped_domain::Charset;
use zonedrop::domain::models::job_run_log::RunStatus;
use zonedrop::domain::models::scheduled_job::{JobStatus, JobType, ScheduledJob};
use zonedrop::domain::models::watchlist::Watchlist;
use zonedrop::domain::repositories::dropped_domain_repository::DroppedDomainRepository;
use zonedrop::domain::repositories::job_run_log_repository::JobRunLogRepository;
use zonedrop::domain::repositories::scheduled_job_repository::ScheduledJobRepository;
use zonedrop::domain::repositories::tld_repository::TldRepository;
use zonedrop::domain::repositories::watchlist_repository::WatchlistRepository;
use zonedrop::queue::scheduler::{dispatch_channel, JobScheduler};
use zonedrop::workers::WorkerManager;

const PREVIOUS: &[&str] = &["alpha", "beta", "gamma"];
const CURRENT: &[&str] = &["alpha", "gamma"];

fn drop_day() -> NaiveDate {
    date(2025, 3, 14)
}

async fn com_job(app: &TestApp) -> ScheduledJob {
    app.jobs
        .create(&ScheduledJob::new("com daily", "com", 2, 0))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_drop_detection_end_to_end() {
    let app = create_test_app().await;
    app.write_snapshot("com", drop_day().pred_opt().unwrap(), PREVIOUS);
    app.write_snapshot("com", drop_day(), CURRENT);

    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let mut short_letters = Watchlist::new(owner_a, "short letters");
    short_letters.charset_filter = Some(Charset::Letters);
    short_letters.max_length = Some(4);
    let mut tiny = Watchlist::new(owner_a, "tiny");
    tiny.max_length = Some(3);
    let everything = Watchlist::new(owner_b, "everything");
    for watchlist in [&short_letters, &tiny, &everything] {
        app.watchlists.create(watchlist).await.unwrap();
    }

    let job = com_job(&app).await;
    let log = app
        .orchestrator
        .execute_for_date(job.id, drop_day())
        .await
        .unwrap();

    assert_eq!(log.status, RunStatus::Success);
    assert_eq!(log.domains_found, 2);
    assert_eq!(log.drops_detected, 1);
    assert!(log.file_size_bytes > 0);

    let drops = app
        .domains
        .find_by_tld_and_date("com", drop_day())
        .await
        .unwrap();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].domain, "beta.com");
    assert_eq!(drops[0].length, 4);
    assert_eq!(drops[0].charset, Charset::Letters);
    assert!(drops[0].quality_score.is_some());

    let tld = app.tlds.find_by_name("com").await.unwrap().unwrap();
    assert_eq!(tld.last_import_date, Some(drop_day()));
    assert_eq!(tld.last_drop_count, 1);

    let sent = app.sink.sent.lock().clone();
    assert_eq!(sent.len(), 2);
    let owners: Vec<Uuid> = sent.iter().map(|n| n.owner_id).collect();
    assert!(owners.contains(&owner_a));
    assert!(owners.contains(&owner_b));
    assert!(sent.iter().all(|n| n.channel == NotificationChannel::Email));
    assert!(sent.iter().all(|n| n.data["matches"][0]["domain"] == "beta.com"));
    assert!(sent
        .iter()
        .any(|n| n.subject == "Watchlist Alert: short letters - 1 Domain(s) Found"));

    let notified = app.watchlists.find_by_id(short_letters.id).await.unwrap().unwrap();
    assert!(notified.last_notified_at.is_some());
    let untouched = app.watchlists.find_by_id(tiny.id).await.unwrap().unwrap();
    assert!(untouched.last_notified_at.is_none());

    let stored = app.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.last_status, JobStatus::Success);
    assert_eq!(stored.total_runs, 1);
    assert_eq!(stored.success_count, 1);

    let logs = app.logs.find_by_job(job.id, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].drops_detected, 1);
    assert!(logs[0].finished_at.is_some());
}

#[tokio::test]
async fn test_rerun_same_day_is_idempotent() {
    let app = create_test_app().await;
    app.write_snapshot("com", drop_day().pred_opt().unwrap(), PREVIOUS);
    app.write_snapshot("com", drop_day(), CURRENT);
    app.watchlists
        .create(&Watchlist::new(Uuid::new_v4(), "everything"))
        .await
        .unwrap();
    let job = com_job(&app).await;

    app.orchestrator
        .execute_for_date(job.id, drop_day())
        .await
        .unwrap();
    let second = app
        .orchestrator
        .execute_for_date(job.id, drop_day())
        .await
        .unwrap();

    assert_eq!(second.status, RunStatus::Success);
    assert_eq!(
        app.domains
            .count_by_tld_and_date("com", drop_day())
            .await
            .unwrap(),
        1
    );
    assert_eq!(app.sink.sent.lock().len(), 1);

    let stored = app.jobs.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.total_runs, 2);
    assert_eq!(app.logs.find_by_job(job.id, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_first_import_without_previous_snapshot() {
    let app = create_test_app().await;
    app.write_snapshot("com", drop_day(), CURRENT);
    let job = com_job(&app).await;

    let log = app
        .orchestrator
        .execute_for_date(job.id, drop_day())
        .await
        .unwrap();

    assert_eq!(log.status, RunStatus::Success);
    assert_eq!(log.domains_found, 2);
    assert_eq!(log.drops_detected, 0);
    assert!(app
        .domains
        .find_by_tld_and_date("com", drop_day())
        .await
        .unwrap()
        .is_empty());
    assert!(app.sink.sent.lock().is_empty());
}

#[tokio::test]
async fn test_download_only_job_records_file_size() {
    let app = create_test_app().await;
    let path = app.write_snapshot("com", drop_day(), CURRENT);
    let mut job = ScheduledJob::new("com download", "com", 2, 0);
    job.job_type = JobType::DownloadOnly;
    let job = app.jobs.create(&job).await.unwrap();

    let log = app
        .orchestrator
        .execute_for_date(job.id, drop_day())
        .await
        .unwrap();

    let size = std::fs::metadata(path).unwrap().len() as i64;
    assert_eq!(log.status, RunStatus::Success);
    assert_eq!(log.file_size_bytes, size);
    assert_eq!(log.domains_found, 0);
}

#[tokio::test]
async fn test_run_now_dispatches_through_worker_manager() {
    let app = create_test_app().await;
    let today = Utc::now().date_naive();
    app.write_snapshot("com", today.pred_opt().unwrap(), PREVIOUS);
    app.write_snapshot("com", today, CURRENT);
    let job = com_job(&app).await;

    let (sender, receiver) = dispatch_channel(8);
    let mut manager = WorkerManager::new(app.orchestrator.clone(), 2);
    manager.start(receiver);
    let scheduler = Arc::new(JobScheduler::new(sender));

    scheduler.run_now(job.id).await.unwrap();

    let mut finished = None;
    for _ in 0..100 {
        let stored = app.jobs.find_by_id(job.id).await.unwrap().unwrap();
        if stored.total_runs == 1 {
            finished = Some(stored);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let stored = finished.expect("job run did not finish in time");
    assert_eq!(stored.last_status, JobStatus::Success);

    let logs = app.logs.list(Some(RunStatus::Success), 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].job_id, job.id);

    manager.shutdown();
}
