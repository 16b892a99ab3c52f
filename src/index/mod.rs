pub mod build;
pub mod codec;
pub mod meta;
pub mod shard;
pub mod stats;
pub mod store;

pub use build::{DEFAULT_SHARD_COUNT, initialize, initialize_at, initialize_with_progress};
pub use meta::{IndexMeta, ShardSummary};
pub use store::ShardIndexStore;
