use std::io;
use std::path::PathBuf;

/// Errors surfaced by the indexing and lookup engine.
///
/// Out-of-range line numbers are not errors; the lookup path reports them
/// as `None`. Everything here is a real fault.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source file or metadata file missing when required.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// Stored shard count differs from the requested one.
    #[error("shard count {requested} differs from indexed shard count {stored}")]
    ConfigMismatch { requested: usize, stored: usize },

    /// Malformed fixed-width record or unreadable metadata.
    #[error("index format error: {0}")]
    Format(String),

    /// Read/write failure on source, shard, or metadata files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The metadata routed a line to a shard whose index has no record
    /// for it. The index no longer matches the source file.
    #[error("index inconsistency: shard {shard} has no record for local line {local_line}")]
    Consistency { shard: usize, local_line: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
