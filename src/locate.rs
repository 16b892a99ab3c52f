use crate::error::{Error, Result};
use crate::index::meta::IndexMeta;
use crate::index::store::ShardIndexStore;
use crate::utils::layout::IndexLayout;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Random access to lines of an indexed source file.
///
/// A locator holds the index metadata in memory; each lookup touches exactly
/// one shard store record and one position in the source file. Lookups take
/// `&self` and open their own file handles, so a locator can be shared
/// across threads.
#[derive(Debug)]
pub struct LineLocator {
    meta: IndexMeta,
    stores: Vec<ShardIndexStore>,
}

impl LineLocator {
    /// Open the index for `source` from the app data directory.
    pub fn open(source: &Path) -> Result<LineLocator> {
        let layout = IndexLayout::for_source(source)?;
        LineLocator::open_at(&layout)
    }

    /// Open an index stored in an explicit directory.
    pub fn open_at(layout: &IndexLayout) -> Result<LineLocator> {
        let meta = IndexMeta::load(&layout.meta_path())?;
        let stores = (0..meta.shard_count)
            .map(|ordinal| ShardIndexStore::new(layout.shard_path(ordinal)))
            .collect();

        Ok(LineLocator { meta, stores })
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn total_lines(&self) -> u64 {
        self.meta.total_lines()
    }

    /// Fetch line `global_line` (zero-based) from the source file.
    ///
    /// Returns `Ok(None)` when the line number is past the end of the file;
    /// that is an ordinary outcome, not an error. The text comes back without
    /// its trailing delimiter.
    pub fn lookup_line(&self, global_line: u64) -> Result<Option<String>> {
        let Some(target) = self.resolve(global_line) else {
            return Ok(None);
        };

        let local_offset = self.stores[target.shard]
            .read_record(target.local_line)?
            .ok_or(Error::Consistency {
                shard: target.shard,
                local_line: target.local_line,
            })?;
        let position = target.base_offset + local_offset;

        let file = File::open(&self.meta.source_path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(position))?;

        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line)?;
        if line.last() == Some(&b'\n') {
            line.pop();
        }

        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Walk the per-shard summaries to place a global line number.
    ///
    /// `base_offset` is the sum of `bytes_scanned` over the shards before the
    /// target; since those spans tile the source, it is the absolute byte
    /// position where the target shard's first line starts.
    fn resolve(&self, global_line: u64) -> Option<ShardTarget> {
        let mut lines_before: u64 = 0;
        let mut base_offset: u64 = 0;

        for (shard, summary) in self.meta.shards.iter().enumerate() {
            if global_line < lines_before + summary.lines {
                return Some(ShardTarget {
                    shard,
                    local_line: global_line - lines_before,
                    base_offset,
                });
            }
            lines_before += summary.lines;
            base_offset += summary.bytes_scanned;
        }

        None
    }
}

struct ShardTarget {
    shard: usize,
    local_line: u64,
    base_offset: u64,
}
