use crate::error::Result;
use crate::index::meta::IndexMeta;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "lix";
const META_FILE: &str = "meta.json";

/// On-disk placement of one source file's index.
///
/// The default placement is a per-source directory under the application
/// data directory; `in_dir` pins the index to an explicit directory instead
/// (tests, or callers that manage their own storage).
#[derive(Debug, Clone)]
pub struct IndexLayout {
    dir: PathBuf,
}

impl IndexLayout {
    /// Layout for `source` under the application data directory.
    pub fn for_source(source: &Path) -> Result<IndexLayout> {
        let indexes_dir = app_data_dir()?.join("indexes");
        fs::create_dir_all(&indexes_dir)?;

        Ok(IndexLayout {
            dir: indexes_dir.join(dir_name_for(source)),
        })
    }

    /// Layout rooted at an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> IndexLayout {
        IndexLayout { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    pub fn shard_path(&self, ordinal: usize) -> PathBuf {
        self.dir.join(format!("shard_{ordinal:04}.idx"))
    }

    /// An index is considered present once its meta file exists. The meta is
    /// written last during a build, so a directory without it is at most a
    /// partial build.
    pub fn is_indexed(&self) -> bool {
        self.meta_path().exists()
    }

    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Delete the whole index directory. Removing an index that does not
    /// exist is not an error.
    pub fn remove(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

/// Application data directory for storing indexes.
pub fn app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base =
        base.ok_or_else(|| io::Error::other("could not determine the app data directory"))?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Unique directory name for a source path.
/// Format: first 16 chars of the file name + hash of the full path.
fn dir_name_for(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let file_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let sanitized: String = file_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    path_str.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{}-{:016x}", sanitized, hash)
}

/// An index found in the application data directory.
#[derive(Debug, Clone)]
pub struct IndexLocation {
    pub source_path: PathBuf,
    pub index_dir: PathBuf,
}

/// List all indexes under the application data directory.
///
/// Directories whose meta file is missing or unreadable are skipped; they
/// are partial builds or leftovers from an older format.
pub fn list_indexed() -> Result<Vec<IndexLocation>> {
    let indexes_dir = app_data_dir()?.join("indexes");

    if !indexes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();

    for entry in fs::read_dir(&indexes_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if let Ok(meta) = IndexMeta::load(&path.join(META_FILE)) {
                found.push(IndexLocation {
                    source_path: meta.source_path,
                    index_dir: path,
                });
            }
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_name_is_stable_per_path() {
        let name1 = dir_name_for(Path::new("/var/log/app.log"));
        let name2 = dir_name_for(Path::new("/var/log/app.log"));
        let name3 = dir_name_for(Path::new("/var/log/other.log"));

        assert_eq!(name1, name2);
        assert_ne!(name1, name3);
        assert!(name1.starts_with("applog-"));
    }

    #[test]
    fn test_shard_and_meta_paths() {
        let layout = IndexLayout::in_dir("/tmp/idx");

        assert_eq!(layout.meta_path(), PathBuf::from("/tmp/idx/meta.json"));
        assert_eq!(
            layout.shard_path(0),
            PathBuf::from("/tmp/idx/shard_0000.idx")
        );
        assert_eq!(
            layout.shard_path(12),
            PathBuf::from("/tmp/idx/shard_0012.idx")
        );
    }

    #[test]
    fn test_is_indexed_requires_meta_file() {
        let tmp = TempDir::new().unwrap();
        let layout = IndexLayout::in_dir(tmp.path().join("idx"));

        assert!(!layout.is_indexed());

        layout.create().unwrap();
        assert!(!layout.is_indexed());

        std::fs::write(layout.meta_path(), b"{}").unwrap();
        assert!(layout.is_indexed());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let layout = IndexLayout::in_dir(tmp.path().join("idx"));

        layout.create().unwrap();
        std::fs::write(layout.meta_path(), b"{}").unwrap();

        layout.remove().unwrap();
        assert!(!layout.dir().exists());

        // Second remove is a no-op.
        layout.remove().unwrap();
    }
}
