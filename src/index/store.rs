use crate::error::{Error, Result};
use crate::index::codec::{decode_offset, encode_offset, RECORD_SIZE};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Write buffer size for shard index files. Index writes are tiny (8 bytes
/// per line), so a large buffer keeps syscall count low on huge sources.
const WRITE_BUF_SIZE: usize = 256 * 1024;

/// One shard's on-disk array of fixed-width offset records.
///
/// Record `i` lives at byte offset `i * 8`; the file length is exactly
/// `line_count * 8`. Built append-only during indexing, read by point
/// lookups during queries.
#[derive(Debug)]
pub struct ShardIndexStore {
    path: PathBuf,
}

impl ShardIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff the backing file is present.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the record at `index`, or `None` if the file ends before a
    /// full record is available (index out of range).
    pub fn read_record(&self, index: u64) -> Result<Option<u64>> {
        if !self.exists() {
            return Err(Error::NotFound(self.path.clone()));
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(index * RECORD_SIZE as u64))?;

        let mut buf = [0u8; RECORD_SIZE];
        match file.read_exact(&mut buf) {
            Ok(()) => Ok(Some(decode_offset(&buf)?)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of complete records in the backing file.
    pub fn record_count(&self) -> Result<u64> {
        let len = std::fs::metadata(&self.path)?.len();
        Ok(len / RECORD_SIZE as u64)
    }

    /// Open an append-only writer, truncating any previous file.
    pub fn writer(&self) -> Result<ShardIndexWriter> {
        let file = File::create(&self.path)?;
        Ok(ShardIndexWriter {
            out: BufWriter::with_capacity(WRITE_BUF_SIZE, file),
        })
    }
}

/// Buffered sequential writer for a shard index file.
///
/// Writes block once the buffer fills, so line production upstream can
/// never outrun the I/O layer.
pub struct ShardIndexWriter {
    out: BufWriter<File>,
}

impl ShardIndexWriter {
    /// Append one line-start offset as a fixed-width record.
    pub fn push(&mut self, offset: u64) -> Result<()> {
        self.out.write_all(&encode_offset(offset))?;
        Ok(())
    }

    /// Flush everything to the OS and close the file. Must be called;
    /// dropping without it can lose buffered records.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
