use crate::error::Result;
use crate::index::meta::ShardSummary;
use crate::index::store::ShardIndexStore;
use memchr::memchr;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Read buffer for the sequential scan over the source file.
const READ_BUF_SIZE: usize = 256 * 1024;

/// Nominal byte window assigned to one shard: `[ordinal*size, (ordinal+1)*size)`.
///
/// The window a shard actually covers is data-dependent: its scan begins at
/// the first line start inside the window and its last line may run past the
/// window end. What holds unconditionally is that a shard indexes exactly the
/// lines whose first byte falls inside the nominal window.
#[derive(Debug, Clone, Copy)]
pub struct ShardWindow {
    pub ordinal: usize,
    pub size: u64,
}

impl ShardWindow {
    pub fn nominal_start(&self) -> u64 {
        self.ordinal as u64 * self.size
    }

    pub fn nominal_end(&self) -> u64 {
        (self.ordinal as u64 + 1) * self.size
    }
}

/// Scan one shard's window of the source file and fill its index store.
///
/// Emits one offset record per line whose first byte lies inside the nominal
/// window; offsets are relative to the shard's aligned scan start. The final
/// line in progress is always completed, so `bytes_scanned` may exceed the
/// nominal window size. Runs as an isolated unit of work; any failure is
/// returned to the coordinator, never retried here.
pub fn build_shard(
    source: &Path,
    window: ShardWindow,
    store: &ShardIndexStore,
) -> Result<ShardSummary> {
    let file = File::open(source)?;
    let source_len = file.metadata()?.len();
    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);

    let aligned = aligned_start(&mut reader, window.nominal_start(), source_len)?;
    // Byte budget measured from the aligned start. Zero when the first line
    // of the window actually starts at or past the window end (a line from
    // an earlier window runs across this one).
    let budget = window.nominal_end().saturating_sub(aligned);

    let mut writer = store.writer()?;
    let mut lines: u64 = 0;
    let mut local_position: u64 = 0;

    if budget > 0 {
        reader.seek(SeekFrom::Start(aligned))?;

        while local_position < budget {
            let mut line_len: u64 = 0;
            let mut terminated = false;

            loop {
                let buf = reader.fill_buf()?;
                if buf.is_empty() {
                    break;
                }
                match memchr(b'\n', buf) {
                    Some(i) => {
                        line_len += i as u64;
                        reader.consume(i + 1);
                        terminated = true;
                        break;
                    }
                    None => {
                        let n = buf.len();
                        line_len += n as u64;
                        reader.consume(n);
                    }
                }
            }

            if !terminated && line_len == 0 {
                // EOF on a line boundary; nothing more to index.
                break;
            }

            writer.push(local_position)?;
            lines += 1;
            // One byte for the delimiter; an unterminated final line is
            // counted as if delimited so byte accounting stays uniform.
            local_position += line_len + 1;

            if !terminated {
                break;
            }
        }
    }

    writer.finish()?;

    Ok(ShardSummary {
        lines,
        bytes_scanned: local_position,
    })
}

/// Find the first line start at or after `nominal_start`.
///
/// Returns `source_len` when no line starts there (the window is covered by
/// a line that began earlier, or lies past EOF). Shard 0 always starts at 0.
fn aligned_start<R: BufRead + Seek>(
    reader: &mut R,
    nominal_start: u64,
    source_len: u64,
) -> Result<u64> {
    if nominal_start == 0 {
        return Ok(0);
    }
    if nominal_start >= source_len {
        return Ok(source_len);
    }

    // The byte before the window decides whether the window begins on a line
    // start, so the probe scans for the first delimiter from one byte back.
    let mut pos = nominal_start - 1;
    reader.seek(SeekFrom::Start(pos))?;

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(source_len);
        }
        match memchr(b'\n', buf) {
            Some(i) => return Ok(pos + i as u64 + 1),
            None => {
                let n = buf.len();
                reader.consume(n);
                pos += n as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("source.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn scan(content: &[u8], ordinal: usize, size: u64) -> (ShardSummary, Vec<u64>) {
        let tmp = TempDir::new().unwrap();
        let source = write_source(&tmp, content);
        let store = ShardIndexStore::new(tmp.path().join(format!("shard_{ordinal:04}.idx")));
        let summary = build_shard(&source, ShardWindow { ordinal, size }, &store).unwrap();

        let mut records = Vec::new();
        for i in 0..summary.lines {
            records.push(store.read_record(i).unwrap().unwrap());
        }
        assert_eq!(store.read_record(summary.lines).unwrap(), None);
        (summary, records)
    }

    #[test]
    fn test_single_window_covers_whole_file() {
        let content = b"one\ntwo\nthree\n";
        let (summary, records) = scan(content, 0, content.len() as u64);

        assert_eq!(summary.lines, 3);
        assert_eq!(summary.bytes_scanned, 14);
        assert_eq!(records, vec![0, 4, 8]);
    }

    #[test]
    fn test_line_in_progress_completed_past_window_end() {
        // "aaaa\nbb\ncc\n" with window size 6: "bb" starts at byte 5, inside
        // the first window, so shard 0 finishes it and scans 8 bytes.
        let content = b"aaaa\nbb\ncc\n";
        let (summary, records) = scan(content, 0, 6);

        assert_eq!(summary.lines, 2);
        assert_eq!(summary.bytes_scanned, 8);
        assert_eq!(records, vec![0, 5]);
    }

    #[test]
    fn test_later_shard_aligns_to_first_line_start_in_window() {
        // Second window [6, 12): the only line starting there is "cc" at
        // byte 8, so the shard starts at 8 and its record is local 0.
        let content = b"aaaa\nbb\ncc\n";
        let (summary, records) = scan(content, 1, 6);

        assert_eq!(summary.lines, 1);
        assert_eq!(summary.bytes_scanned, 3);
        assert_eq!(records, vec![0]);
    }

    #[test]
    fn test_empty_line_at_window_boundary_is_indexed() {
        // "ab\n\ncd\n" split at 4: the empty line starts at byte 3, inside
        // window 0, and must be indexed there.
        let content = b"ab\n\ncd\n";
        let (first, first_records) = scan(content, 0, 4);
        let (second, second_records) = scan(content, 1, 4);

        assert_eq!(first.lines, 2);
        assert_eq!(first.bytes_scanned, 4);
        assert_eq!(first_records, vec![0, 3]);

        assert_eq!(second.lines, 1);
        assert_eq!(second.bytes_scanned, 3);
        assert_eq!(second_records, vec![0]);
    }

    #[test]
    fn test_long_line_leaves_covered_windows_empty() {
        // One line spans windows 1 and 2 entirely; both must index nothing
        // and report zero bytes so cumulative accounting stays exact.
        let content = b"a\nbbbbbbbbbb\nc\n";
        let (s0, _) = scan(content, 0, 4);
        let (s1, _) = scan(content, 1, 4);
        let (s2, _) = scan(content, 2, 4);
        let (s3, r3) = scan(content, 3, 4);

        assert_eq!((s0.lines, s0.bytes_scanned), (2, 13));
        assert_eq!((s1.lines, s1.bytes_scanned), (0, 0));
        assert_eq!((s2.lines, s2.bytes_scanned), (0, 0));
        assert_eq!((s3.lines, s3.bytes_scanned), (1, 2));
        assert_eq!(r3, vec![0]);

        // The line's shard is the one whose window holds its first byte.
        assert_eq!(s0.lines + s1.lines + s2.lines + s3.lines, 3);
    }

    #[test]
    fn test_unterminated_final_line_counts_a_delimiter() {
        let (summary, records) = scan(b"abc", 0, 3);

        assert_eq!(summary.lines, 1);
        assert_eq!(summary.bytes_scanned, 4);
        assert_eq!(records, vec![0]);
    }

    #[test]
    fn test_window_past_eof_is_empty() {
        let (summary, _) = scan(b"a\n", 2, 1);

        assert_eq!(summary.lines, 0);
        assert_eq!(summary.bytes_scanned, 0);
    }

    #[test]
    fn test_aligned_start_probe() {
        let content = b"aaaa\nbb\ncc\n";
        let len = content.len() as u64;

        let mut reader = Cursor::new(&content[..]);
        assert_eq!(aligned_start(&mut reader, 0, len).unwrap(), 0);
        // Window starting right on a line start.
        assert_eq!(aligned_start(&mut reader, 5, len).unwrap(), 5);
        // Window starting mid-line aligns forward.
        assert_eq!(aligned_start(&mut reader, 6, len).unwrap(), 8);
        // No line start at or past the trailing delimiter.
        assert_eq!(aligned_start(&mut reader, 11, len).unwrap(), len);
        assert_eq!(aligned_start(&mut reader, 100, len).unwrap(), len);
    }
}
