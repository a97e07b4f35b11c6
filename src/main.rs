// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zonedrop::application::use_cases::job_management::JobManagementUseCase;
use zonedrop::config::settings::Settings;
use zonedrop::domain::services::drop_detector::DropPersistence;
use zonedrop::domain::services::notification_service::NotificationSink;
use zonedrop::domain::services::watchlist_matcher::WatchlistMatcher;
use zonedrop::infrastructure::database::connection;
use zonedrop::infrastructure::repositories::dropped_domain_repo_impl::DroppedDomainRepoImpl;
use zonedrop::infrastructure::repositories::job_run_log_repo_impl::JobRunLogRepoImpl;
use zonedrop::infrastructure::repositories::scheduled_job_repo_impl::ScheduledJobRepoImpl;
use zonedrop::infrastructure::repositories::tld_repo_impl::TldRepoImpl;
use zonedrop::infrastructure::repositories::watchlist_repo_impl::WatchlistRepoImpl;
use zonedrop::infrastructure::services::file_zone_source::FileZoneSource;
use zonedrop::infrastructure::services::log_notification_sink::LogNotificationSink;
use zonedrop::infrastructure::services::webhook_notification_sink::WebhookNotificationSink;
use zonedrop::queue::scheduler::{dispatch_channel, JobScheduler};
use zonedrop::workers::{PipelineOrchestrator, WorkerManager};

use migration::{Migrator, MigratorTrait};
use zonedrop::utils::telemetry;

/// 调度器与工作器之间的投递队列容量
const DISPATCH_QUEUE_CAPACITY: usize = 256;

/// 主函数
///
/// 初始化所有组件，载入启用的任务并运行调度器，直到收到 Ctrl-C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting zonedrop...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    if settings.metrics.enabled {
        if let Err(e) = zonedrop::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr) {
            warn!("Metrics exporter disabled: {}", e);
        }
    }

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Repositories and collaborators
    let jobs = Arc::new(ScheduledJobRepoImpl::new(db.clone()));
    let logs = Arc::new(JobRunLogRepoImpl::new(db.clone()));
    let domains = Arc::new(DroppedDomainRepoImpl::new(db.clone()));
    let tlds = Arc::new(TldRepoImpl::new(db.clone()));
    let watchlists = Arc::new(WatchlistRepoImpl::new(db.clone()));
    let zone_source = Arc::new(FileZoneSource::new(&settings.pipeline.zone_data_dir));

    let sink: Arc<dyn NotificationSink> = match (
        settings.notification.sink.as_str(),
        settings.notification.webhook_url.as_deref(),
    ) {
        ("webhook", Some(url)) => Arc::new(WebhookNotificationSink::new(
            url,
            settings.notification.secret.clone(),
            Duration::from_secs(settings.notification.timeout_seconds),
        )?),
        ("webhook", None) => {
            warn!("Webhook sink selected without a url, falling back to log sink");
            Arc::new(LogNotificationSink)
        }
        _ => Arc::new(LogNotificationSink),
    };

    let persistence = Arc::new(DropPersistence::new(
        domains,
        tlds,
        (&settings.pipeline).into(),
    ));
    let matcher = Arc::new(WatchlistMatcher::new(
        watchlists,
        sink,
        (&settings.matcher).into(),
    ));
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        jobs.clone(),
        logs.clone(),
        zone_source,
        persistence,
        matcher,
        settings.pipeline.parse_chunk_size,
    ));

    // 5. Start workers
    let (sender, receiver) = dispatch_channel(DISPATCH_QUEUE_CAPACITY);
    let mut manager = WorkerManager::new(orchestrator, settings.scheduler.worker_slots);
    manager.start(receiver);

    // 6. Load enabled jobs and start the scheduler
    let scheduler = Arc::new(JobScheduler::new(sender));
    let use_case = JobManagementUseCase::new(jobs, logs, scheduler.clone());
    let loaded = use_case.initialize_scheduler().await?;
    info!(jobs = loaded, "Scheduled jobs loaded");

    if settings.scheduler.enabled {
        scheduler.start(Duration::from_secs(settings.scheduler.tick_seconds.max(1)));
    } else {
        info!("Scheduler disabled by configuration, jobs only run on demand");
    }

    manager.wait_for_shutdown().await;
    scheduler.stop();
    info!("zonedrop stopped");
    Ok(())
}
