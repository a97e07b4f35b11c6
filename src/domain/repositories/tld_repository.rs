// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tld::Tld;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 顶级域名仓库特质
#[async_trait]
pub trait TldRepository: Send + Sync {
    /// 根据名称查找顶级域名
    async fn find_by_name(&self, name: &str) -> Result<Option<Tld>, RepositoryError>;
    /// 查找顶级域名，不存在时创建
    async fn find_or_create(&self, name: &str) -> Result<Tld, RepositoryError>;
    /// 更新导入元数据（最近导入日期与新写入的掉落数量）
    async fn update_import_metadata(
        &self,
        name: &str,
        import_date: NaiveDate,
        drop_count: i64,
    ) -> Result<(), RepositoryError>;
}
