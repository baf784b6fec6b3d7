//! Year-partitioned JSON history of every promotion relayed.
//!
//! Each save is a whole-file read-modify-write with no locking. That is only
//! sound while one run executes at a time, which the scheduler guarantees.
use chrono::{DateTime, Datelike, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::model::{ArchiveEntry, AssetRecord};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("archive JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ArchiveStore {
    dir: PathBuf,
    affiliate_id: String,
}

impl ArchiveStore {
    pub fn new(dir: impl Into<PathBuf>, affiliate_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            affiliate_id: affiliate_id.into(),
        }
    }

    pub fn path_for_year(&self, year: i32) -> PathBuf {
        self.dir.join(format!("assets_archive_{year}.json"))
    }

    /// Best-effort append stamped with the current time. Failures are logged.
    pub fn save(&self, record: &AssetRecord) -> bool {
        self.save_at(record, Utc::now())
    }

    pub fn save_at(&self, record: &AssetRecord, now: DateTime<Utc>) -> bool {
        match self.append(record, now) {
            Ok(path) => {
                info!(path = %path.display(), "archived promotion");
                true
            }
            Err(err) => {
                error!(%err, "failed to archive promotion");
                false
            }
        }
    }

    fn append(&self, record: &AssetRecord, now: DateTime<Utc>) -> Result<PathBuf, ArchiveError> {
        let path = self.path_for_year(now.year());
        let mut entries = read_entries(&path)?;
        entries.push(ArchiveEntry::new(record, &self.affiliate_id, now));

        fs::create_dir_all(&self.dir).map_err(|source| ArchiveError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(&entries).map_err(|source| ArchiveError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ArchiveError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// All entries in an archive file; a missing file is an empty archive.
pub fn read_entries(path: &Path) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArchiveError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(code: &str) -> AssetRecord {
        AssetRecord {
            name: format!("Pack {code}"),
            url: "https://assetstore.unity.com/packages/1".into(),
            code: code.into(),
            publisher_url: "https://assetstore.unity.com/publishers/2".into(),
            end_date: "Unknown Date".into(),
        }
    }

    #[test]
    fn file_name_follows_year() {
        let store = ArchiveStore::new("/data", "A");
        assert_eq!(store.path_for_year(2025), PathBuf::from("/data/assets_archive_2025.json"));
    }

    #[test]
    fn years_are_partitioned() {
        let td = tempdir().unwrap();
        let store = ArchiveStore::new(td.path(), "A");
        let dec = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        let jan = Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        assert!(store.save_at(&record("OLD"), dec));
        assert!(store.save_at(&record("NEW"), jan));
        assert_eq!(read_entries(&store.path_for_year(2024)).unwrap().len(), 1);
        let newer = read_entries(&store.path_for_year(2025)).unwrap();
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].code, "NEW");
        assert_eq!(newer[0].url, "https://assetstore.unity.com/packages/1?aid=A");
    }

    #[test]
    fn corrupt_file_is_reported_not_overwritten() {
        let td = tempdir().unwrap();
        let store = ArchiveStore::new(td.path(), "A");
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let path = store.path_for_year(2025);
        fs::write(&path, "{ not json").unwrap();
        assert!(!store.save_at(&record("X"), now));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn missing_dir_is_created() {
        let td = tempdir().unwrap();
        let store = ArchiveStore::new(td.path().join("nested/archive"), "A");
        assert!(store.save(&record("X")));
    }
}
