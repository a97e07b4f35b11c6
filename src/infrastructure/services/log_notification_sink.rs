// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::alert::NotificationChannel;
use crate::domain::services::notification_service::NotificationSink;
use crate::utils::errors::NotificationError;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// 仅写日志的通知下游
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send(
        &self,
        owner_id: Uuid,
        channel: NotificationChannel,
        subject: &str,
        message: &str,
        data: &serde_json::Value,
    ) -> Result<(), NotificationError> {
        info!(
            %owner_id,
            %channel,
            subject,
            total_matches = data["total_matches"].as_u64().unwrap_or_default(),
            "{}",
            message
        );
        Ok(())
    }
}
