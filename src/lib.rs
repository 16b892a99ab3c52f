//! # lix - Sharded Line Index
//!
//! lix answers "what is line N of this file?" in constant time for text
//! files far too large to hold in memory, through a persistent byte-offset
//! index built in parallel shards.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Index building: shard scanning, offset stores, metadata
//! - [`locate`] - Line lookups against a built index
//! - [`error`] - Error taxonomy shared across the crate
//! - [`utils`] - Index placement and progress reporting
//!
//! ## Quick Start
//!
//! ```ignore
//! use lix::index::build::initialize;
//! use lix::locate::LineLocator;
//! use std::path::Path;
//!
//! let source = Path::new("/var/log/huge.log");
//!
//! // Build the index with four shards, or reuse an existing one
//! initialize(source, 4, false).unwrap();
//!
//! // Fetch line 2,000,000 without scanning the file
//! let locator = LineLocator::open(source).unwrap();
//! if let Some(line) = locator.lookup_line(2_000_000).unwrap() {
//!     println!("{line}");
//! }
//! ```
//!
//! ## How it works
//!
//! The source file is cut into equal byte windows, one per shard. Each
//! shard scans its window in parallel and records the start offset of every
//! line whose first byte falls inside the window, as fixed-width records
//! relative to the shard's own start. The per-shard line and byte totals in
//! the metadata are enough to turn a global line number into one record
//! read and one seek into the source file.

pub mod error;
pub mod index;
pub mod locate;
pub mod utils;
