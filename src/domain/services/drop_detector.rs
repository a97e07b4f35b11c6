// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::dropped_domain::{Charset, DroppedDomain};
use crate::domain::models::tld::normalize_tld;
use crate::domain::repositories::dropped_domain_repository::DroppedDomainRepository;
use crate::domain::repositories::tld_repository::TldRepository;
use crate::domain::services::quality_scorer;
use crate::domain::services::zone_parser::build_domain_name;
use crate::utils::errors::RepositoryError;
use crate::utils::retry_policy::RetryPolicy;
use chrono::NaiveDate;
use metrics::counter;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 计算掉落标签：`previous - current`
///
/// 结果按升序排列
pub fn compute_dropped(previous: &HashSet<String>, current: &HashSet<String>) -> BTreeSet<String> {
    previous.difference(current).cloned().collect()
}

/// 标签字符集分类
///
/// 全字母为 `letters`，全 ASCII 数字为 `numbers`，其余（包括空串）为 `mixed`
pub fn classify_charset(label: &str) -> Charset {
    if label.is_empty() {
        Charset::Mixed
    } else if label.chars().all(char::is_alphabetic) {
        Charset::Letters
    } else if label.chars().all(|c| c.is_ascii_digit()) {
        Charset::Numbers
    } else {
        Charset::Mixed
    }
}

/// 持久化参数
#[derive(Debug, Clone)]
pub struct PersistenceOptions {
    /// 每批插入的记录数
    pub batch_size: usize,
    /// 每处理多少条记录暂停一次，0 表示不暂停
    pub throttle_every: usize,
    /// 暂停时长
    pub throttle_pause: Duration,
    /// 瞬时错误的最大重试次数
    pub max_retries: u32,
    /// 固定重试退避
    pub retry_backoff: Duration,
    /// 写入前是否计算质量分
    pub score_drops: bool,
}

impl Default for PersistenceOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            throttle_every: 5000,
            throttle_pause: Duration::from_secs(1),
            max_retries: 3,
            retry_backoff: Duration::from_secs(2),
            score_drops: true,
        }
    }
}

/// 持久化结果
#[derive(Debug, Clone, Default)]
pub struct PersistOutcome {
    /// 新写入的记录数（不含跳过的）
    pub inserted: u64,
    /// 已存在而跳过的记录数
    pub skipped: u64,
    /// 重试耗尽后写入失败的记录数
    pub failed: u64,
    /// 本次新写入的记录
    pub persisted: Vec<DroppedDomain>,
}

/// 掉落域名持久化服务
///
/// 幂等地批量写入掉落记录：批量失败时按固定退避重试，
/// 仍失败或遇到唯一约束冲突时退化为逐行写入
pub struct DropPersistence {
    domains: Arc<dyn DroppedDomainRepository>,
    tlds: Arc<dyn TldRepository>,
    options: PersistenceOptions,
    retry: RetryPolicy,
}

impl DropPersistence {
    /// 创建新的持久化服务
    ///
    /// # 参数
    ///
    /// * `domains` - 掉落域名仓库
    /// * `tlds` - 顶级域名仓库
    /// * `options` - 持久化参数
    pub fn new(
        domains: Arc<dyn DroppedDomainRepository>,
        tlds: Arc<dyn TldRepository>,
        options: PersistenceOptions,
    ) -> Self {
        let retry = RetryPolicy::fixed(options.max_retries, options.retry_backoff);
        Self {
            domains,
            tlds,
            options,
            retry,
        }
    }

    /// 顶级域名是否启用；尚未登记的顶级域名视为启用
    pub async fn is_tld_active(&self, tld: &str) -> Result<bool, RepositoryError> {
        let tld = normalize_tld(tld);
        Ok(self
            .tlds
            .find_by_name(&tld)
            .await?
            .map_or(true, |t| t.is_active))
    }

    /// 持久化一组掉落标签
    ///
    /// # 参数
    ///
    /// * `tld` - 顶级域名
    /// * `drop_date` - 掉落日期
    /// * `labels` - 掉落标签（升序）
    ///
    /// # 返回值
    ///
    /// * `Ok(PersistOutcome)` - 写入统计
    /// * `Err(RepositoryError)` - 查询已有记录或更新顶级域名元数据失败
    pub async fn persist(
        &self,
        tld: &str,
        drop_date: NaiveDate,
        labels: &BTreeSet<String>,
    ) -> Result<PersistOutcome, RepositoryError> {
        let tld = normalize_tld(tld);
        self.tlds.find_or_create(&tld).await?;

        let existing = self.domains.existing_domains(&tld, drop_date).await?;
        let mut outcome = PersistOutcome::default();

        let mut pending: Vec<DroppedDomain> = Vec::with_capacity(labels.len());
        for label in labels {
            if existing.contains(&build_domain_name(label, &tld)) {
                outcome.skipped += 1;
                continue;
            }
            let mut record = DroppedDomain::new(label, &tld, drop_date, classify_charset(label));
            if self.options.score_drops {
                record = record.with_score(quality_scorer::score(label, &tld).total);
            }
            pending.push(record);
        }

        let total = pending.len();
        let batch_size = self.options.batch_size.max(1);
        let mut processed = 0usize;
        let mut since_pause = 0usize;

        while !pending.is_empty() {
            let take = batch_size.min(pending.len());
            let batch: Vec<DroppedDomain> = pending.drain(..take).collect();
            self.insert_batch(batch, &mut outcome).await;

            processed += take;
            since_pause += take;
            if self.options.throttle_every > 0 && since_pause >= self.options.throttle_every {
                since_pause = 0;
                info!(
                    tld = %tld,
                    processed,
                    total,
                    inserted = outcome.inserted,
                    "Drop persistence progress, pausing"
                );
                pending.shrink_to_fit();
                tokio::time::sleep(self.options.throttle_pause).await;
            }
        }

        self.tlds
            .update_import_metadata(&tld, drop_date, outcome.inserted as i64)
            .await?;

        counter!("zonedrop_drops_persisted_total").increment(outcome.inserted);
        info!(
            tld = %tld,
            %drop_date,
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Drop persistence finished"
        );
        Ok(outcome)
    }

    async fn insert_batch(&self, batch: Vec<DroppedDomain>, outcome: &mut PersistOutcome) {
        let bulk = self
            .retry
            .run("bulk insert", |e: &RepositoryError| !e.is_conflict(), || {
                self.domains.insert_many(&batch)
            })
            .await;

        match bulk {
            Ok(_) => {
                outcome.inserted += batch.len() as u64;
                outcome.persisted.extend(batch);
            }
            Err(e) => {
                if e.is_conflict() {
                    debug!("Batch hit a duplicate, falling back to row-by-row insert");
                } else {
                    warn!("Bulk insert failed after retries, falling back to row-by-row: {}", e);
                }
                self.insert_rows(batch, outcome).await;
            }
        }
    }

    async fn insert_rows(&self, batch: Vec<DroppedDomain>, outcome: &mut PersistOutcome) {
        for record in batch {
            let result = self
                .retry
                .run("row insert", |e: &RepositoryError| !e.is_conflict(), || {
                    self.domains.insert_one(&record)
                })
                .await;

            match result {
                Ok(()) => {
                    outcome.inserted += 1;
                    outcome.persisted.push(record);
                }
                Err(e) if e.is_conflict() => outcome.skipped += 1,
                Err(e) => {
                    warn!(domain = %record.domain, "Giving up on row after retries: {}", e);
                    outcome.failed += 1;
                }
            }
        }
    }

    /// 为尚未计算质量分的记录补算质量分
    ///
    /// # 返回值
    ///
    /// 本次更新的记录数
    pub async fn backfill_quality_scores(&self, limit: u64) -> Result<u64, RepositoryError> {
        let unscored = self.domains.find_unscored(limit).await?;
        let mut updated = 0;
        for record in unscored {
            let result = quality_scorer::score(record.label(), &record.tld);
            self.domains
                .set_quality_score(record.id, result.total)
                .await?;
            updated += 1;
        }
        if updated > 0 {
            info!(updated, "Backfilled quality scores");
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "drop_detector_test.rs"]
mod tests;
