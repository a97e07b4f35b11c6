// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册流水线指标
///
/// # 参数
///
/// * `listen_addr` - 导出器监听地址，如 `0.0.0.0:9000`
pub fn init_metrics(listen_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", listen_addr))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_counter!(
        "zonedrop_drops_persisted_total",
        "Total number of dropped domains written to storage"
    );
    describe_counter!(
        "zonedrop_job_runs_total",
        "Total number of pipeline runs by final status"
    );
    describe_histogram!(
        "zonedrop_job_duration_seconds",
        Unit::Seconds,
        "Duration of pipeline runs"
    );
    describe_counter!(
        "zonedrop_notifications_total",
        "Total number of watchlist alerts by channel and outcome"
    );
    describe_gauge!(
        "zonedrop_scheduled_jobs",
        "Number of jobs currently registered with the scheduler"
    );

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
