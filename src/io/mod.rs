//! Sequential-scan and append-only file primitives.
//!
//! Profile runs and the recovery log are both strictly sequential: runs are
//! written once and read front to back, the log is appended and replayed.
//! These two access patterns are the only file I/O in the crate, so the
//! layer exposes exactly two types:
//!
//! - [`SequentialFile`] - buffered read-only scanning with a zero-copy
//!   window into the read buffer (`fill`/`consume`).
//! - [`AppendFile`] - buffered appending, either page-buffered (profile
//!   runs) or staged-and-fsynced as atomic sync units (the log).

pub mod append;
pub mod sequential;

pub use append::AppendFile;
pub use sequential::SequentialFile;

/// Buffer size for both readers and writers. One page keeps the resident
/// footprint predictable next to the user-sized working memory region.
pub const PAGE_SIZE: usize = 4096;
