use crate::error::Result;
use crate::index::meta::IndexMeta;
use crate::index::store::ShardIndexStore;
use crate::utils::layout::{self, IndexLayout};
use std::path::Path;

/// Display index statistics for a source file
pub fn show_stats(source: &Path) -> Result<()> {
    let layout = IndexLayout::for_source(source)?;
    let meta = IndexMeta::load(&layout.meta_path())?;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Source file:      {}", meta.source_path.display());
    println!("Source size:      {}", format_size(meta.source_len));
    println!("Index location:   {}", layout.dir().display());
    println!("Index version:    {}", meta.version);
    println!("Shard count:      {}", meta.shard_count);
    println!("Total lines:      {}", meta.total_lines());

    // Record counts come from the store files themselves, so a truncated or
    // missing store shows up as a records/lines divergence.
    println!();
    println!("Lines by shard:");
    for (ordinal, shard) in meta.shards.iter().enumerate().take(16) {
        let records = ShardIndexStore::new(layout.shard_path(ordinal))
            .record_count()
            .unwrap_or(0);
        println!(
            "  shard_{:04}   {:>12} lines   {:>12} records   {:>10} scanned",
            ordinal,
            shard.lines,
            records,
            format_size(shard.bytes_scanned)
        );
    }
    if meta.shard_count > 16 {
        println!("  ... and {} more", meta.shard_count - 16);
    }

    // Index size
    if let Ok(size) = dir_size(layout.dir()) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    println!();
    println!("Created:          {}", format_timestamp(meta.created_at));

    Ok(())
}

/// List all indexed source files
pub fn list_indexes() -> Result<()> {
    let indexes = layout::list_indexed()?;

    if indexes.is_empty() {
        println!("No indexed files found.");
        return Ok(());
    }

    println!("Indexed Files");
    println!("=============");
    println!();

    for index in indexes {
        let exists = index.source_path.exists();
        let status = if exists { "" } else { " [missing]" };
        println!("  {}{}", index.source_path.display(), status);
        println!("    Index: {}", index.index_dir.display());
        println!();
    }

    Ok(())
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix timestamp
fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    let datetime = UNIX_EPOCH + Duration::from_secs(ts);
    format!("{:?}", datetime)
}
