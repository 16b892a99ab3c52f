use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current on-disk meta format. Bumped on incompatible layout changes.
pub const META_VERSION: u32 = 1;

/// Per-shard accounting produced by the build.
///
/// `bytes_scanned` is the shard's actual coverage: the sum of `len + 1` over
/// its lines. Concatenated in shard order these spans tile the source file,
/// which is what lets a lookup turn a shard ordinal into an absolute byte
/// position without touching the other shards' stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSummary {
    pub lines: u64,
    pub bytes_scanned: u64,
}

/// Index metadata persisted next to the shard stores as `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub source_path: PathBuf,
    pub source_len: u64,
    pub shard_count: usize,
    pub shards: Vec<ShardSummary>,
    pub created_at: u64,
}

impl IndexMeta {
    pub fn new(source_path: PathBuf, source_len: u64, shards: Vec<ShardSummary>) -> Self {
        IndexMeta {
            version: META_VERSION,
            source_path,
            source_len,
            shard_count: shards.len(),
            shards,
            created_at: unix_now(),
        }
    }

    pub fn total_lines(&self) -> u64 {
        self.shards.iter().map(|s| s.lines).sum()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Format(format!("failed to encode index meta: {e}")))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let meta: IndexMeta = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::Format(format!("invalid index meta: {e}")))?;

        if meta.version != META_VERSION {
            return Err(Error::Format(format!(
                "unsupported index version {} (expected {})",
                meta.version, META_VERSION
            )));
        }
        if meta.shard_count != meta.shards.len() {
            return Err(Error::Format(format!(
                "meta declares {} shards but lists {}",
                meta.shard_count,
                meta.shards.len()
            )));
        }

        Ok(meta)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn summaries() -> Vec<ShardSummary> {
        vec![
            ShardSummary { lines: 3, bytes_scanned: 120 },
            ShardSummary { lines: 0, bytes_scanned: 0 },
            ShardSummary { lines: 5, bytes_scanned: 260 },
        ]
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("meta.json");

        let meta = IndexMeta::new(PathBuf::from("/data/app.log"), 380, summaries());
        meta.save(&path).unwrap();

        let loaded = IndexMeta::load(&path).unwrap();
        assert_eq!(loaded.version, META_VERSION);
        assert_eq!(loaded.source_path, PathBuf::from("/data/app.log"));
        assert_eq!(loaded.source_len, 380);
        assert_eq!(loaded.shard_count, 3);
        assert_eq!(loaded.shards, summaries());
        assert_eq!(loaded.total_lines(), 8);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = IndexMeta::load(&tmp.path().join("meta.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("meta.json");

        let mut meta = IndexMeta::new(PathBuf::from("x"), 0, Vec::new());
        meta.version = 99;
        let json = serde_json::to_string_pretty(&meta).unwrap();
        std::fs::write(&path, json).unwrap();

        let err = IndexMeta::load(&path).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("meta.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = IndexMeta::load(&path).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_load_rejects_shard_count_mismatch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("meta.json");

        let mut meta = IndexMeta::new(PathBuf::from("x"), 10, summaries());
        meta.shard_count = 2;
        let json = serde_json::to_string_pretty(&meta).unwrap();
        std::fs::write(&path, json).unwrap();

        let err = IndexMeta::load(&path).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
