// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::alert::NotificationChannel;
use crate::utils::errors::NotificationError;
use async_trait::async_trait;
use uuid::Uuid;

/// 通知下游特质
///
/// 每个告警分组的每个启用渠道调用一次
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 发送通知
    ///
    /// # 参数
    ///
    /// * `owner_id` - 接收者
    /// * `channel` - 通知渠道
    /// * `subject` - 标题
    /// * `message` - 纯文本正文
    /// * `data` - 结构化数据
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 发送成功
    /// * `Err(NotificationError)` - 发送失败
    async fn send(
        &self,
        owner_id: Uuid,
        channel: NotificationChannel,
        subject: &str,
        message: &str,
        data: &serde_json::Value,
    ) -> Result<(), NotificationError>;
}
