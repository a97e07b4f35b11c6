// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::tld::normalize_tld;
use crate::domain::services::zone_source::ZoneSource;
use crate::utils::errors::ZoneSourceError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 基于本地目录的区域快照来源
///
/// 快照路径为 `<data_dir>/zones/<tld>/<YYYYMMDD>.zone`
#[derive(Debug, Clone)]
pub struct FileZoneSource {
    data_dir: PathBuf,
}

impl FileZoneSource {
    /// 创建新的文件快照来源
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 快照文件路径
    pub fn snapshot_path(&self, tld: &str, date: NaiveDate) -> PathBuf {
        snapshot_path(&self.data_dir, tld, date)
    }

    fn unavailable(tld: &str, date: NaiveDate, err: std::io::Error) -> ZoneSourceError {
        if err.kind() == ErrorKind::NotFound {
            ZoneSourceError::Unavailable {
                tld: tld.to_string(),
                date,
            }
        } else {
            ZoneSourceError::Io(err)
        }
    }
}

fn snapshot_path(data_dir: &Path, tld: &str, date: NaiveDate) -> PathBuf {
    data_dir
        .join("zones")
        .join(normalize_tld(tld))
        .join(format!("{}.zone", date.format("%Y%m%d")))
}

#[async_trait]
impl ZoneSource for FileZoneSource {
    async fn download(&self, tld: &str, date: NaiveDate) -> Result<u64, ZoneSourceError> {
        let path = self.snapshot_path(tld, date);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Self::unavailable(tld, date, e))?;
        debug!(path = %path.display(), size = metadata.len(), "Zone snapshot located");
        Ok(metadata.len())
    }

    async fn fetch(&self, tld: &str, date: NaiveDate) -> Result<String, ZoneSourceError> {
        let path = self.snapshot_path(tld, date);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Self::unavailable(tld, date, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
