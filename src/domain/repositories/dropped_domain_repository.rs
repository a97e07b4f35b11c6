// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::dropped_domain::DroppedDomain;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

/// 掉落域名仓库特质
///
/// 定义掉落域名的数据访问接口
#[async_trait]
pub trait DroppedDomainRepository: Send + Sync {
    /// 查询指定顶级域名在指定日期已存储的完整域名
    async fn existing_domains(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<HashSet<String>, RepositoryError>;

    /// 批量插入
    ///
    /// 整批作为一条语句写入；任一行违反唯一约束时整批失败并返回 `Conflict`
    async fn insert_many(&self, records: &[DroppedDomain]) -> Result<u64, RepositoryError>;

    /// 插入单条记录
    async fn insert_one(&self, record: &DroppedDomain) -> Result<(), RepositoryError>;

    /// 查询指定顶级域名在指定日期的全部掉落域名
    async fn find_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<Vec<DroppedDomain>, RepositoryError>;

    /// 统计指定顶级域名在指定日期的掉落数量
    async fn count_by_tld_and_date(
        &self,
        tld: &str,
        drop_date: NaiveDate,
    ) -> Result<u64, RepositoryError>;

    /// 查找尚未计算质量分的记录
    async fn find_unscored(&self, limit: u64) -> Result<Vec<DroppedDomain>, RepositoryError>;

    /// 写入质量分
    async fn set_quality_score(&self, id: Uuid, score: i32) -> Result<(), RepositoryError>;
}
