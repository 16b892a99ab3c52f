#![no_main]

use libfuzzer_sys::fuzz_target;
use lix::index::build::initialize_at;
use lix::locate::LineLocator;
use lix::utils::layout::IndexLayout;

fuzz_target!(|input: (u8, &[u8])| {
    // Fuzz the whole build + lookup pipeline with arbitrary file bytes and
    // shard counts: every line must come back exactly once, and the shard
    // spans must tile the file.
    let (raw_shards, data) = input;
    let shards = 1 + (raw_shards % 8) as usize;

    let tmp = tempfile::TempDir::new().unwrap();
    let source = tmp.path().join("source");
    std::fs::write(&source, data).unwrap();

    let layout = IndexLayout::in_dir(tmp.path().join("idx"));
    initialize_at(&layout, &source, shards, false, true).unwrap();
    let locator = LineLocator::open_at(&layout).unwrap();

    // Reference answer straight from the buffer
    let mut expected: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
    if data.is_empty() || data.last() == Some(&b'\n') {
        expected.pop();
    }

    assert_eq!(locator.total_lines(), expected.len() as u64);
    for (i, line) in expected.iter().enumerate() {
        let got = locator.lookup_line(i as u64).unwrap().unwrap();
        assert_eq!(got, String::from_utf8_lossy(line));
    }
    assert!(locator.lookup_line(expected.len() as u64).unwrap().is_none());

    let scanned: u64 = locator.meta().shards.iter().map(|s| s.bytes_scanned).sum();
    let want_scanned = if data.is_empty() {
        0
    } else if data.last() == Some(&b'\n') {
        data.len() as u64
    } else {
        data.len() as u64 + 1
    };
    assert_eq!(scanned, want_scanned);
});
