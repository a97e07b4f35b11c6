// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_db;
use chrono::{Duration, Timelike, Utc};
use std::sync::Arc;
use zonedrop::application::dto::job_request::{BulkCreateJobsRequest, CreateJobRequest};
use zonedrop::application::use_cases::job_management::JobManagementUseCase;
use zonedrop::domain::models::scheduled_job::JobType;
use zonedrop::domain::repositories::scheduled_job_repository::ScheduledJobRepository;
use zonedrop::infrastructure::repositories::job_run_log_repo_impl::JobRunLogRepoImpl;
use zonedrop::infrastructure::repositories::scheduled_job_repo_impl::ScheduledJobRepoImpl;
use zonedrop::queue::scheduler::{dispatch_channel, JobScheduler};

#[tokio::test]
async fn test_bulk_jobs_survive_restart() {
    let db = create_test_db().await;
    let jobs = Arc::new(ScheduledJobRepoImpl::new(db.clone()));
    let logs = Arc::new(JobRunLogRepoImpl::new(db.clone()));

    let (sender, _receiver) = dispatch_channel(8);
    let first = JobManagementUseCase::new(
        jobs.clone(),
        logs.clone(),
        Arc::new(JobScheduler::new(sender)),
    );
    let result = first
        .bulk_create(BulkCreateJobsRequest {
            tlds: vec!["a".to_string(), ".B".to_string(), "c".to_string()],
            start_hour: 0,
            interval_minutes: 30,
            job_type: JobType::Full,
            priority: 5,
        })
        .await
        .unwrap();
    assert_eq!(result.created.len(), 3);

    let mut stored: Vec<(String, i32, i32)> = jobs
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|j| (j.tld, j.cron_hour, j.cron_minute))
        .collect();
    stored.sort();
    assert_eq!(
        stored,
        vec![
            ("a".to_string(), 0, 0),
            ("b".to_string(), 0, 30),
            ("c".to_string(), 1, 0),
        ]
    );

    // a new process sees the same schedule
    let (sender, _receiver) = dispatch_channel(8);
    let scheduler = Arc::new(JobScheduler::new(sender));
    let second = JobManagementUseCase::new(jobs.clone(), logs, scheduler.clone());
    assert_eq!(second.initialize_scheduler().await.unwrap(), 3);

    for entry in scheduler.all_jobs() {
        assert!(entry.next_run > Utc::now());
        assert_eq!(entry.next_run.second(), 0);
        let job = jobs.find_by_id(entry.job_id).await.unwrap().unwrap();
        assert_eq!(job.next_run_at, Some(entry.next_run));
        assert_eq!(
            (entry.hour, entry.minute),
            (job.cron_hour as u32, job.cron_minute as u32)
        );
    }
}

#[tokio::test]
async fn test_due_jobs_are_dispatched_once_per_tick() {
    let db = create_test_db().await;
    let jobs = Arc::new(ScheduledJobRepoImpl::new(db.clone()));
    let logs = Arc::new(JobRunLogRepoImpl::new(db));
    let (sender, mut receiver) = dispatch_channel(8);
    let scheduler = Arc::new(JobScheduler::new(sender));
    let use_case = JobManagementUseCase::new(jobs, logs, scheduler.clone());

    let com = use_case
        .create_job(CreateJobRequest::new("com daily", "com", 2, 0))
        .await
        .unwrap();
    let mut paused = CreateJobRequest::new("net daily", "net", 2, 0);
    paused.is_enabled = false;
    use_case.create_job(paused).await.unwrap();

    // two days late still fires once
    let fired = scheduler.tick(Utc::now() + Duration::days(2)).unwrap();
    assert_eq!(fired, vec![com.id]);
    assert_eq!(receiver.recv().await, Some(com.id));
    assert!(receiver.try_recv().is_err());

    let entry = scheduler.job_info(com.id).unwrap();
    assert!(entry.next_run > Utc::now() + Duration::days(2));
}
