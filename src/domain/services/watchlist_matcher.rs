// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::alert::{AlertGroup, AlertSample};
use crate::domain::models::dropped_domain::DroppedDomain;
use crate::domain::models::watchlist::Watchlist;
use crate::domain::repositories::watchlist_repository::WatchlistRepository;
use crate::domain::services::notification_service::NotificationSink;
use crate::utils::errors::RepositoryError;
use chrono::Utc;
use metrics::counter;
use regex::{Regex, RegexBuilder};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 缺失质量分时最低质量分过滤的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinScorePolicy {
    /// 缺失质量分视为通过
    #[default]
    Lenient,
    /// 缺失质量分视为不通过
    Strict,
}

impl FromStr for MinScorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(MinScorePolicy::Lenient),
            "strict" => Ok(MinScorePolicy::Strict),
            other => Err(format!("unknown min score policy: {}", other)),
        }
    }
}

/// 匹配器参数
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    /// 每个告警的样本上限
    pub sample_size: usize,
    /// 缺失质量分策略
    pub min_score_policy: MinScorePolicy,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            sample_size: 20,
            min_score_policy: MinScorePolicy::Lenient,
        }
    }
}

/// 匹配与通知统计
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub total_domains: usize,
    pub total_watchlists: usize,
    /// 所有关注列表上的匹配总数
    pub total_matches: usize,
    pub groups: Vec<AlertGroup>,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    /// 更新最近通知时间失败的分组数
    pub groups_failed: usize,
}

/// 编译标签模式
///
/// 含 `*` 的模式视为锚定在标签开头的通配符，`*` 匹配任意字符序列，尾部不锚定；
/// 不含 `*` 的模式按不区分大小写的正则在标签中搜索。
/// 非法模式返回 `None`，即不过滤。
pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }
    let source = if pattern.contains('*') {
        format!("^(?:{})", pattern.replace('*', ".*"))
    } else {
        pattern.to_string()
    };
    match RegexBuilder::new(&source).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!(pattern, "Ignoring invalid watchlist pattern: {}", e);
            None
        }
    }
}

/// 关注列表匹配器
pub struct WatchlistMatcher {
    watchlists: Arc<dyn WatchlistRepository>,
    sink: Arc<dyn NotificationSink>,
    options: MatcherOptions,
}

impl WatchlistMatcher {
    /// 创建新的匹配器
    pub fn new(
        watchlists: Arc<dyn WatchlistRepository>,
        sink: Arc<dyn NotificationSink>,
        options: MatcherOptions,
    ) -> Self {
        Self {
            watchlists,
            sink,
            options,
        }
    }

    /// 判断域名是否满足关注列表的全部过滤条件
    pub fn matches(
        &self,
        watchlist: &Watchlist,
        pattern: Option<&Regex>,
        domain: &DroppedDomain,
    ) -> bool {
        if let Some(regex) = pattern {
            if !regex.is_match(domain.label()) {
                return false;
            }
        }

        if let Some(filter) = watchlist.tld_filter.as_deref() {
            let allowed: Vec<String> = filter
                .split(',')
                .map(|t| t.trim().trim_start_matches('.').to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            if !allowed.is_empty() && !allowed.contains(&domain.tld.to_lowercase()) {
                return false;
            }
        }

        if let Some(min) = watchlist.min_length {
            if domain.length < min {
                return false;
            }
        }
        if let Some(max) = watchlist.max_length {
            if domain.length > max {
                return false;
            }
        }

        if let Some(charset) = watchlist.charset_filter {
            if domain.charset != charset {
                return false;
            }
        }

        if let Some(min_score) = watchlist.min_quality_score {
            let passes = match domain.quality_score {
                Some(score) => score >= min_score,
                None => self.options.min_score_policy == MinScorePolicy::Lenient,
            };
            if !passes {
                return false;
            }
        }

        true
    }

    /// 按 (所有者, 关注列表) 分组匹配结果
    ///
    /// 遍历每个关注列表与每个域名，不做按所有者的短路
    pub fn group_matches(
        &self,
        watchlists: &[Watchlist],
        domains: &[DroppedDomain],
    ) -> Vec<AlertGroup> {
        let mut groups = Vec::new();
        for watchlist in watchlists {
            let pattern = watchlist.domain_pattern.as_deref().and_then(compile_pattern);
            let matched: Vec<&DroppedDomain> = domains
                .iter()
                .filter(|d| self.matches(watchlist, pattern.as_ref(), d))
                .collect();
            if matched.is_empty() {
                continue;
            }

            groups.push(AlertGroup {
                owner_id: watchlist.owner_id,
                watchlist_id: watchlist.id,
                watchlist_name: watchlist.name.clone(),
                total_matches: matched.len(),
                samples: matched
                    .iter()
                    .take(self.options.sample_size)
                    .map(|d| AlertSample {
                        domain: d.domain.clone(),
                        tld: d.tld.clone(),
                        drop_date: d.drop_date,
                        quality_score: d.quality_score,
                    })
                    .collect(),
            });
        }
        groups
    }

    /// 匹配新写入的掉落域名并发送告警
    ///
    /// 单个渠道或分组的失败只记录日志并计数，不影响其他渠道与分组
    ///
    /// # 参数
    ///
    /// * `domains` - 本次新写入的掉落域名
    ///
    /// # 返回值
    ///
    /// * `Ok(MatchReport)` - 匹配与发送统计
    /// * `Err(RepositoryError)` - 加载关注列表失败
    pub async fn match_and_notify(
        &self,
        domains: &[DroppedDomain],
    ) -> Result<MatchReport, RepositoryError> {
        let watchlists = self.watchlists.find_active().await?;
        let groups = self.group_matches(&watchlists, domains);

        let mut report = MatchReport {
            total_domains: domains.len(),
            total_watchlists: watchlists.len(),
            total_matches: groups.iter().map(|g| g.total_matches).sum(),
            ..Default::default()
        };

        for group in &groups {
            let Some(watchlist) = watchlists.iter().find(|w| w.id == group.watchlist_id) else {
                continue;
            };
            let subject = group.subject();
            let message = group.message();
            let data = group.data();

            for channel in watchlist.enabled_channels() {
                match self
                    .sink
                    .send(group.owner_id, channel, &subject, &message, &data)
                    .await
                {
                    Ok(()) => {
                        report.notifications_sent += 1;
                        counter!(
                            "zonedrop_notifications_total",
                            "channel" => channel.to_string(),
                            "outcome" => "sent"
                        )
                        .increment(1);
                    }
                    Err(e) => {
                        report.notifications_failed += 1;
                        counter!(
                            "zonedrop_notifications_total",
                            "channel" => channel.to_string(),
                            "outcome" => "failed"
                        )
                        .increment(1);
                        error!(
                            owner_id = %group.owner_id,
                            watchlist_id = %group.watchlist_id,
                            %channel,
                            "Failed to send watchlist alert: {}",
                            e
                        );
                    }
                }
            }

            if let Err(e) = self.watchlists.mark_notified(group.watchlist_id, Utc::now()).await {
                report.groups_failed += 1;
                error!(
                    watchlist_id = %group.watchlist_id,
                    "Failed to update last notified time: {}",
                    e
                );
            }
        }

        report.groups = groups;
        info!(
            domains = report.total_domains,
            watchlists = report.total_watchlists,
            matches = report.total_matches,
            sent = report.notifications_sent,
            failed = report.notifications_failed,
            "Watchlist matching finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "watchlist_matcher_test.rs"]
mod tests;
