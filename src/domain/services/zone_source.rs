// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ZoneSourceError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 区域快照来源特质
///
/// `ZoneSourceError::Unavailable` 表示该日期没有快照，
/// 编排器会据此跳过掉落检测而不是判定任务失败
#[async_trait]
pub trait ZoneSource: Send + Sync {
    /// 确保指定日期的快照已就绪，返回文件大小（字节）
    async fn download(&self, tld: &str, date: NaiveDate) -> Result<u64, ZoneSourceError>;

    /// 读取指定日期的快照全文
    async fn fetch(&self, tld: &str, date: NaiveDate) -> Result<String, ZoneSourceError>;
}
