// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 掉落域名实体
///
/// 表示某个标签在前一日区域快照中存在、而在当日快照中消失。
/// (domain, drop_date) 唯一，除惰性计算的质量分外不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedDomain {
    /// 唯一标识符
    pub id: Uuid,
    /// 完整域名，例如 `beta.com`
    pub domain: String,
    /// 所属顶级域名
    pub tld: String,
    /// 掉落日期
    pub drop_date: NaiveDate,
    /// 标签字符长度
    pub length: i32,
    /// 标签段数量
    pub label_count: i32,
    /// 字符集分类
    pub charset: Charset,
    /// 质量分（0-100），尚未计算时为空
    pub quality_score: Option<i32>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl DroppedDomain {
    /// 创建新的掉落域名记录
    ///
    /// # 参数
    ///
    /// * `label` - 二级标签
    /// * `tld` - 顶级域名
    /// * `drop_date` - 掉落日期
    /// * `charset` - 字符集分类
    ///
    /// # 返回值
    ///
    /// 未带质量分的新记录
    pub fn new(label: &str, tld: &str, drop_date: NaiveDate, charset: Charset) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: format!("{}.{}", label, tld),
            tld: tld.to_string(),
            drop_date,
            length: label.chars().count() as i32,
            label_count: 1,
            charset,
            quality_score: None,
            created_at: Utc::now(),
        }
    }

    /// 附加质量分
    pub fn with_score(mut self, score: i32) -> Self {
        self.quality_score = Some(score);
        self
    }

    /// 返回去掉顶级域名后缀的标签
    pub fn label(&self) -> &str {
        self.domain
            .strip_suffix(self.tld.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or(&self.domain)
    }
}

/// 标签字符集分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// 全部为字母
    Letters,
    /// 全部为 ASCII 数字
    Numbers,
    /// 其他组合
    Mixed,
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Charset::Letters => write!(f, "letters"),
            Charset::Numbers => write!(f, "numbers"),
            Charset::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "letters" => Ok(Charset::Letters),
            "numbers" => Ok(Charset::Numbers),
            "mixed" => Ok(Charset::Mixed),
            other => Err(format!("unknown charset: {}", other)),
        }
    }
}
