// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 通知渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Telegram,
    Discord,
    Webhook,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotificationChannel::Email => write!(f, "email"),
            NotificationChannel::Telegram => write!(f, "telegram"),
            NotificationChannel::Discord => write!(f, "discord"),
            NotificationChannel::Webhook => write!(f, "webhook"),
        }
    }
}

/// 告警中的单个样本域名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSample {
    pub domain: String,
    pub tld: String,
    pub drop_date: NaiveDate,
    pub quality_score: Option<i32>,
}

/// 按 (用户, 关注列表) 分组的匹配结果
///
/// `samples` 被截断到配置的样本上限，`total_matches` 保留真实数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertGroup {
    /// 关注列表所有者
    pub owner_id: Uuid,
    /// 关注列表ID
    pub watchlist_id: Uuid,
    /// 关注列表名称
    pub watchlist_name: String,
    /// 匹配总数
    pub total_matches: usize,
    /// 截断后的样本
    pub samples: Vec<AlertSample>,
}

impl AlertGroup {
    /// 告警标题
    pub fn subject(&self) -> String {
        format!(
            "Watchlist Alert: {} - {} Domain(s) Found",
            self.watchlist_name, self.total_matches
        )
    }

    /// 纯文本告警正文
    pub fn message(&self) -> String {
        let mut lines = vec![
            format!("Watchlist Alert: {}", self.watchlist_name),
            String::new(),
            format!("Found {} matching dropped domain(s):", self.total_matches),
            String::new(),
        ];
        for sample in &self.samples {
            let score = sample
                .quality_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!("- {} (Score: {})", sample.domain, score));
        }
        if self.total_matches > self.samples.len() {
            lines.push(format!(
                "... and {} more domain(s)",
                self.total_matches - self.samples.len()
            ));
        }
        lines.join("\n")
    }

    /// 传递给通知下游的结构化数据
    pub fn data(&self) -> serde_json::Value {
        serde_json::json!({
            "watchlist_id": self.watchlist_id,
            "watchlist_name": self.watchlist_name,
            "total_matches": self.total_matches,
            "matches": self.samples,
        })
    }
}
