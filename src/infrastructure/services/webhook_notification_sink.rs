// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::alert::NotificationChannel;
use crate::domain::services::notification_service::NotificationSink;
use crate::utils::errors::NotificationError;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// 投递到通知中继的请求体
#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    owner_id: Uuid,
    channel: NotificationChannel,
    subject: &'a str,
    message: &'a str,
    data: &'a serde_json::Value,
}

/// Webhook 通知下游
///
/// 将告警以 JSON POST 到通知中继，由中继负责邮件、Telegram 等渠道的实际投递。
/// 请求带 `X-Zonedrop-Signature` 头，值为 `HMAC-SHA256(secret, "{timestamp}.{body}")` 的十六进制
pub struct WebhookNotificationSink {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl WebhookNotificationSink {
    /// 创建新的 Webhook 通知下游
    ///
    /// # 参数
    ///
    /// * `endpoint` - 通知中继地址
    /// * `secret` - 签名密钥
    /// * `timeout` - 请求超时
    ///
    /// HTTP 客户端无法构建时返回 `Transport` 错误
    pub fn new(
        endpoint: impl Into<String>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Transport(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            secret: secret.into(),
        })
    }

    /// 为请求体生成签名
    pub fn sign(&self, payload: &str, timestamp: i64) -> Result<String, NotificationError> {
        hmac_hex(&self.secret, &format!("{}.{}", timestamp, payload))
    }
}

fn hmac_hex(secret: &str, message: &str) -> Result<String, NotificationError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| NotificationError::Transport(format!("invalid signing key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn send(
        &self,
        owner_id: Uuid,
        channel: NotificationChannel,
        subject: &str,
        message: &str,
        data: &serde_json::Value,
    ) -> Result<(), NotificationError> {
        let body = serde_json::to_string(&RelayPayload {
            owner_id,
            channel,
            subject,
            message,
            data,
        })?;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(&body, timestamp)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Zonedrop-Signature", signature)
            .header("X-Zonedrop-Timestamp", timestamp.to_string())
            .header("X-Zonedrop-Channel", channel.to_string())
            .body(body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
