// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 顶级域名实体
///
/// 名称即为唯一键。导入元数据只在流水线成功（或无掉落）后更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tld {
    /// 顶级域名名称（小写，不含点）
    pub name: String,
    /// 展示名称
    pub display_name: Option<String>,
    /// 是否启用
    pub is_active: bool,
    /// 最近一次导入的掉落日期
    pub last_import_date: Option<NaiveDate>,
    /// 最近一次新写入的掉落数量
    pub last_drop_count: i64,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Tld {
    /// 创建新的顶级域名
    ///
    /// 名称会去掉前导点并转为小写
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            name: normalize_tld(name),
            display_name: None,
            is_active: true,
            last_import_date: None,
            last_drop_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 规范化顶级域名：去空白、去前导点、转小写
pub fn normalize_tld(name: &str) -> String {
    name.trim().trim_start_matches('.').to_lowercase()
}
