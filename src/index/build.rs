use crate::error::{Error, Result};
use crate::index::meta::{IndexMeta, ShardSummary};
use crate::index::shard::{build_shard, ShardWindow};
use crate::index::store::ShardIndexStore;
use crate::utils::layout::IndexLayout;
use crate::utils::progress::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::Path;

/// Default number of shards when the caller does not choose one.
pub const DEFAULT_SHARD_COUNT: usize = 4;

/// Build or reuse the line index for a source file.
pub fn initialize(source: &Path, shard_count: usize, force: bool) -> Result<()> {
    initialize_with_progress(source, shard_count, force, false)
}

/// Build or reuse the line index with optional silent mode.
pub fn initialize_with_progress(
    source: &Path,
    shard_count: usize,
    force: bool,
    silent: bool,
) -> Result<()> {
    let layout = IndexLayout::for_source(source)?;
    initialize_at(&layout, source, shard_count, force, silent)
}

/// Build or reuse the index in an explicit directory.
///
/// An existing index is reused as-is when its shard count matches; a
/// different stored count is a `ConfigMismatch` error unless `force` is set.
/// Shards are built in parallel, and any shard failure aborts the build and
/// removes the partial index directory.
pub fn initialize_at(
    layout: &IndexLayout,
    source: &Path,
    shard_count: usize,
    force: bool,
    silent: bool,
) -> Result<()> {
    if shard_count == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "shard count must be at least 1",
        )
        .into());
    }
    if !source.is_file() {
        return Err(Error::NotFound(source.to_path_buf()));
    }
    let source = source.canonicalize()?;

    if layout.is_indexed() && !force {
        let meta = IndexMeta::load(&layout.meta_path())?;
        if meta.shard_count == shard_count {
            return Ok(());
        }
        return Err(Error::ConfigMismatch {
            requested: shard_count,
            stored: meta.shard_count,
        });
    }

    // A build always starts from an empty directory so no shard file from an
    // earlier layout can survive into the new index.
    layout.remove()?;
    layout.create()?;

    let source_len = source.metadata()?.len();
    let window_size = source_len.div_ceil(shard_count as u64);

    if !silent {
        println!("Indexing: {}", source.display());
    }

    let progress = if !silent {
        let pb = ProgressBar::new(shard_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );
        Some(pb)
    } else {
        None
    };

    let summaries: Result<Vec<ShardSummary>> = (0..shard_count)
        .into_par_iter()
        .map(|ordinal| {
            let store = ShardIndexStore::new(layout.shard_path(ordinal));
            let result = build_shard(
                &source,
                ShardWindow {
                    ordinal,
                    size: window_size,
                },
                &store,
            );
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect();

    let summaries = match summaries {
        Ok(summaries) => summaries,
        Err(e) => {
            let _ = layout.remove();
            return Err(e);
        }
    };

    // Written last: a directory only counts as indexed once the meta exists,
    // so a crash before this point leaves a partial build, not a bad index.
    let meta = IndexMeta::new(source, source_len, summaries);
    if let Err(e) = meta.save(&layout.meta_path()) {
        let _ = layout.remove();
        return Err(e);
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Indexed {} lines across {} shards",
            meta.total_lines(),
            shard_count
        ));
    }
    if !silent {
        println!("Index stored at: {}", layout.dir().display());
    }

    Ok(())
}
