// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::watchlist::Watchlist;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 关注列表仓库特质
#[async_trait]
pub trait WatchlistRepository: Send + Sync {
    /// 创建关注列表
    async fn create(&self, watchlist: &Watchlist) -> Result<Watchlist, RepositoryError>;
    /// 根据ID查找关注列表
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Watchlist>, RepositoryError>;
    /// 查找所有启用的关注列表
    async fn find_active(&self) -> Result<Vec<Watchlist>, RepositoryError>;
    /// 更新最近通知时间
    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError>;
}
