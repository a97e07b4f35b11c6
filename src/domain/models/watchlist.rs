// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::alert::NotificationChannel;
use super::dropped_domain::Charset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 关注列表实体
///
/// 用户定义的一组过滤条件，未设置的条件不参与过滤。
/// 匹配器只会修改 `last_notified_at`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    /// 唯一标识符
    pub id: Uuid,
    /// 所有者ID
    pub owner_id: Uuid,
    /// 名称
    pub name: String,
    /// 标签模式，支持 `*` 通配符
    pub domain_pattern: Option<String>,
    /// 逗号分隔的顶级域名白名单
    pub tld_filter: Option<String>,
    /// 最小长度（含）
    pub min_length: Option<i32>,
    /// 最大长度（含）
    pub max_length: Option<i32>,
    /// 字符集过滤
    pub charset_filter: Option<Charset>,
    /// 最低质量分
    pub min_quality_score: Option<i32>,
    pub notify_email: bool,
    pub notify_telegram: bool,
    pub notify_discord: bool,
    pub notify_webhook: bool,
    /// 是否启用
    pub is_active: bool,
    /// 最近通知时间
    pub last_notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Watchlist {
    /// 创建一个不带任何过滤条件、仅启用邮件通知的关注列表
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            domain_pattern: None,
            tld_filter: None,
            min_length: None,
            max_length: None,
            charset_filter: None,
            min_quality_score: None,
            notify_email: true,
            notify_telegram: false,
            notify_discord: false,
            notify_webhook: false,
            is_active: true,
            last_notified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 已启用的通知渠道
    pub fn enabled_channels(&self) -> Vec<NotificationChannel> {
        [
            (self.notify_email, NotificationChannel::Email),
            (self.notify_telegram, NotificationChannel::Telegram),
            (self.notify_discord, NotificationChannel::Discord),
            (self.notify_webhook, NotificationChannel::Webhook),
        ]
        .into_iter()
        .filter_map(|(enabled, channel)| enabled.then_some(channel))
        .collect()
    }
}
