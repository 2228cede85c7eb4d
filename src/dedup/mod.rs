//! Bounded-memory word deduplication.
//!
//! The profiling stage funnels every token through this module:
//!
//! - [`bloom`] - words split into a fixed-width integer prefix plus an
//!   optional pooled suffix, so comparisons are mostly a single u64 compare.
//! - [`arena`] - a double-ended allocator over the working memory region:
//!   fixed-size items grow from the low end, suffix bytes from the high end.
//! - [`pool`] - the sort-based dedup pool: accept `(word, offset)` pairs
//!   until the arena is full, then pour them out as one sorted,
//!   deduplicated profile run.

pub mod arena;
pub mod bloom;
pub mod pool;

pub use arena::{Arena, DedupItem};
pub use bloom::BloomKey;
pub use pool::DedupPool;
