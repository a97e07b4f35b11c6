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

use crate::domain::services::drop_detector::PersistenceOptions;
use crate::domain::services::watchlist_matcher::{MatcherOptions, MinScorePolicy};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、调度器、流水线、关注列表匹配、通知以及指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 调度器配置
    pub scheduler: SchedulerSettings,
    /// 流水线配置
    pub pipeline: PipelineSettings,
    /// 关注列表匹配配置
    pub matcher: MatcherSettings,
    /// 通知配置
    pub notification: NotificationSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 是否启用调度器
    pub enabled: bool,
    /// 并发执行槽位数量
    pub worker_slots: usize,
    /// 调度检查间隔（秒）
    pub tick_seconds: u64,
}

/// 流水线配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 区域文件数据目录
    pub zone_data_dir: String,
    /// 批量插入大小
    pub batch_size: usize,
    /// 每处理多少条记录暂停一次
    pub throttle_every: usize,
    /// 暂停时长（毫秒）
    pub throttle_millis: u64,
    /// 存储层最大重试次数
    pub max_retries: u32,
    /// 固定重试退避（毫秒）
    pub retry_backoff_millis: u64,
    /// 解析时每多少个新标签让出一次运行时
    pub parse_chunk_size: usize,
    /// 持久化前是否计算质量分
    pub score_drops: bool,
}

/// 关注列表匹配配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherSettings {
    /// 每个告警中的样本数量上限
    pub sample_size: usize,
    /// 缺失质量分时的处理策略 (lenient, strict)
    pub min_score_policy: String,
}

/// 通知配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// 通知下游类型 (log, webhook)
    pub sink: String,
    /// 中继端点地址 (当 sink=webhook 时使用)
    pub webhook_url: Option<String>,
    /// 签名密钥
    pub secret: String,
    /// 请求超时（秒）
    pub timeout_seconds: u64,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件以及环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ZONEDROP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值构建配置
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://zonedrop.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scheduler settings
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.worker_slots", 5)?
            .set_default("scheduler.tick_seconds", 30)?
            // Default pipeline settings
            .set_default("pipeline.zone_data_dir", "./data")?
            .set_default("pipeline.batch_size", 500)?
            .set_default("pipeline.throttle_every", 5000)?
            .set_default("pipeline.throttle_millis", 1000)?
            .set_default("pipeline.max_retries", 3)?
            .set_default("pipeline.retry_backoff_millis", 2000)?
            .set_default("pipeline.parse_chunk_size", 50000)?
            .set_default("pipeline.score_drops", true)?
            // Default matcher settings
            .set_default("matcher.sample_size", 20)?
            .set_default("matcher.min_score_policy", "lenient")?
            // Default notification settings
            .set_default("notification.sink", "log")?
            .set_default("notification.secret", "change-me")?
            .set_default("notification.timeout_seconds", 10)?
            // Default metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

impl From<&PipelineSettings> for PersistenceOptions {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            batch_size: settings.batch_size.max(1),
            throttle_every: settings.throttle_every,
            throttle_pause: Duration::from_millis(settings.throttle_millis),
            max_retries: settings.max_retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_millis),
            score_drops: settings.score_drops,
        }
    }
}

impl From<&MatcherSettings> for MatcherOptions {
    fn from(settings: &MatcherSettings) -> Self {
        let policy = settings
            .min_score_policy
            .parse::<MinScorePolicy>()
            .unwrap_or_default();
        Self {
            sample_size: settings.sample_size.max(1),
            min_score_policy: policy,
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
